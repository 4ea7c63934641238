use fingerset_engine::{Bir, ReleaseBir};

/// Where a record's memory came from, which decides how it is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Returned by the engine; must go back through the engine.
    EngineAllocated,
    /// Read from a file or snapshot; owned by us.
    Imported,
}

/// One enrolled template plus its release tag.
#[derive(Debug)]
pub struct Record {
    bir: Bir,
    origin: Origin,
}

impl Record {
    pub fn engine_allocated(bir: Bir) -> Self {
        Self {
            bir,
            origin: Origin::EngineAllocated,
        }
    }

    pub fn imported(bir: Bir) -> Self {
        Self {
            bir,
            origin: Origin::Imported,
        }
    }

    pub fn bir(&self) -> &Bir {
        &self.bir
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// The only place records are deallocated.
    pub fn release(self, releaser: &mut dyn ReleaseBir) {
        match self.origin {
            Origin::EngineAllocated => releaser.free_bir(self.bir),
            Origin::Imported => drop(self.bir),
        }
    }
}
