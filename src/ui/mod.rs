//! Binding layer between controllers and whatever displays them.

pub mod dom;
pub mod form;
pub mod table;

pub use dom::{Behavior, Document, ElementId, Event, EventKind, Scope, Target};
pub use form::Form;
pub use table::{Row, Table};

use async_trait::async_trait;

/// Browser-level facilities a controller needs but does not own.
#[async_trait(?Send)]
pub trait Host {
    /// Asks the user to confirm a destructive action.
    async fn confirm(&self, prompt: &str) -> bool;

    /// Leaves the current page.
    fn navigate(&self, target: &str);
}

#[cfg(test)]
pub mod testing {
    use std::cell::RefCell;

    use async_trait::async_trait;

    use super::Host;

    /// Host that answers confirmations from a script and records navigation.
    pub struct ScriptedHost {
        pub answer: bool,
        pub prompts: RefCell<Vec<String>>,
        pub visited: RefCell<Vec<String>>,
    }

    impl ScriptedHost {
        pub fn answering(answer: bool) -> Self {
            Self {
                answer,
                prompts: RefCell::new(Vec::new()),
                visited: RefCell::new(Vec::new()),
            }
        }
    }

    #[async_trait(?Send)]
    impl Host for ScriptedHost {
        async fn confirm(&self, prompt: &str) -> bool {
            self.prompts.borrow_mut().push(prompt.to_string());
            self.answer
        }

        fn navigate(&self, target: &str) {
            self.visited.borrow_mut().push(target.to_string());
        }
    }
}
