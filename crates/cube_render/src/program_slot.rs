/// Holder for the active program.
///
/// A replacement is built first and only then swapped in, after which the old
/// program is dropped. When the build fails the slot is left untouched, so a
/// slot that had a usable program keeps it.
#[derive(Debug)]
pub struct ProgramSlot<P> {
    current: Option<P>,
}

impl<P> ProgramSlot<P> {
    pub fn empty() -> Self {
        Self { current: None }
    }

    pub fn current(&self) -> Option<&P> {
        self.current.as_ref()
    }

    pub fn is_bound(&self) -> bool {
        self.current.is_some()
    }

    /// Runs `build` and installs its result. On error the previous program
    /// stays bound and the error is returned.
    pub fn replace_with<E>(&mut self, build: impl FnOnce() -> Result<P, E>) -> Result<(), E> {
        let next = build()?;
        let previous = self.current.replace(next);
        drop(previous);
        Ok(())
    }

    /// Drops the bound program, if any. Returns whether one was bound.
    pub fn clear(&mut self) -> bool {
        self.current.take().is_some()
    }
}

impl<P> Default for ProgramSlot<P> {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Stand-in program that records when it is dropped.
    #[derive(Debug)]
    struct Program {
        name: &'static str,
        dropped: Rc<RefCell<Vec<&'static str>>>,
    }

    impl Drop for Program {
        fn drop(&mut self) {
            self.dropped.borrow_mut().push(self.name);
        }
    }

    fn program(name: &'static str, dropped: &Rc<RefCell<Vec<&'static str>>>) -> Program {
        Program {
            name,
            dropped: Rc::clone(dropped),
        }
    }

    #[test]
    fn starts_empty() {
        let slot: ProgramSlot<Program> = ProgramSlot::empty();
        assert!(!slot.is_bound());
        assert!(slot.current().is_none());
    }

    #[test]
    fn successful_build_replaces_and_drops_previous() {
        let dropped = Rc::new(RefCell::new(Vec::new()));
        let mut slot = ProgramSlot::empty();
        slot.replace_with(|| Ok::<_, ()>(program("a", &dropped))).unwrap();
        slot.replace_with(|| Ok::<_, ()>(program("b", &dropped))).unwrap();

        assert_eq!(slot.current().map(|p| p.name), Some("b"));
        assert_eq!(*dropped.borrow(), vec!["a"]);
    }

    #[test]
    fn failed_build_keeps_previous_program() {
        let dropped = Rc::new(RefCell::new(Vec::new()));
        let mut slot = ProgramSlot::empty();
        slot.replace_with(|| Ok::<_, &str>(program("a", &dropped))).unwrap();

        let result = slot.replace_with(|| Err("compile error"));
        assert_eq!(result, Err("compile error"));
        assert_eq!(slot.current().map(|p| p.name), Some("a"));
        assert!(dropped.borrow().is_empty());
    }

    #[test]
    fn failed_build_on_empty_slot_stays_empty() {
        let mut slot: ProgramSlot<Program> = ProgramSlot::empty();
        assert!(slot.replace_with(|| Err(())).is_err());
        assert!(!slot.is_bound());
    }

    #[test]
    fn clear_is_idempotent() {
        let dropped = Rc::new(RefCell::new(Vec::new()));
        let mut slot = ProgramSlot::empty();
        slot.replace_with(|| Ok::<_, ()>(program("a", &dropped))).unwrap();

        assert!(slot.clear());
        assert!(!slot.clear());
        assert_eq!(*dropped.borrow(), vec!["a"]);
    }
}
