//! Pipeline description produced by the parser
//!
//! A pipeline borrows its words from the expanded token list; nothing here
//! owns process state.

/// One program invocation within a pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stage<'a> {
    /// Program name followed by its arguments
    pub argv: Vec<&'a str>,
    /// Path given with `<`, if any
    pub input: Option<&'a str>,
    /// Path given with `>`, if any
    pub output: Option<&'a str>,
}

impl<'a> Stage<'a> {
    /// The program name, if the stage has any words at all
    pub fn program(&self) -> Option<&'a str> {
        self.argv.first().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.argv.is_empty()
    }
}

/// An ordered sequence of stages plus the background flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline<'a> {
    pub stages: Vec<Stage<'a>>,
    pub background: bool,
}

impl<'a> Default for Pipeline<'a> {
    fn default() -> Self {
        Pipeline {
            stages: vec![Stage::default()],
            background: false,
        }
    }
}

impl<'a> Pipeline<'a> {
    /// A pipeline whose first stage has no words has nothing to run
    pub fn is_empty(&self) -> bool {
        self.stages.first().map_or(true, Stage::is_empty)
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// The first stage, when it is the only one
    pub fn single(&self) -> Option<&Stage<'a>> {
        match self.stages.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }
}
