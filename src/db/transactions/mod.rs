/// Committed state plus the working copy taken at BEGIN.
///
/// The snapshot exists exactly while a transaction is open. Readers and
/// writers go through [`Staged::visible`] / [`Staged::visible_mut`], so the
/// committed value is untouched until [`Staged::commit`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Staged<T> {
    committed: T,
    snapshot: Option<T>,
}

impl<T: Clone> Staged<T> {
    pub fn new(value: T) -> Self {
        Self {
            committed: value,
            snapshot: None,
        }
    }

    pub fn in_transaction(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn visible(&self) -> &T {
        self.snapshot.as_ref().unwrap_or(&self.committed)
    }

    pub fn visible_mut(&mut self) -> &mut T {
        match &mut self.snapshot {
            Some(snapshot) => snapshot,
            None => &mut self.committed,
        }
    }

    pub fn committed(&self) -> &T {
        &self.committed
    }

    /// Returns false when a transaction was already open.
    pub fn begin(&mut self) -> bool {
        if self.snapshot.is_some() {
            return false;
        }
        self.snapshot = Some(self.committed.clone());
        true
    }

    pub fn commit(&mut self) -> bool {
        match self.snapshot.take() {
            Some(snapshot) => {
                self.committed = snapshot;
                true
            }
            None => false,
        }
    }

    pub fn rollback(&mut self) -> bool {
        self.snapshot.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_go_to_the_snapshot_while_open() {
        let mut staged = Staged::new(vec![1, 2]);
        assert!(staged.begin());
        staged.visible_mut().push(3);
        assert_eq!(staged.visible(), &vec![1, 2, 3]);
        assert_eq!(staged.committed(), &vec![1, 2]);
        assert!(staged.commit());
        assert_eq!(staged.committed(), &vec![1, 2, 3]);
        assert!(!staged.in_transaction());
    }

    #[test]
    fn rollback_restores_committed_state() {
        let mut staged = Staged::new(vec![1]);
        staged.begin();
        staged.visible_mut().clear();
        assert!(staged.rollback());
        assert_eq!(staged.visible(), &vec![1]);
        assert!(!staged.rollback());
    }

    #[test]
    fn begin_twice_is_rejected() {
        let mut staged = Staged::new(0);
        assert!(staged.begin());
        *staged.visible_mut() = 5;
        assert!(!staged.begin());
        assert_eq!(staged.visible(), &5);
    }

    #[test]
    fn writes_without_transaction_hit_committed_state() {
        let mut staged = Staged::new(String::from("a"));
        staged.visible_mut().push('b');
        assert_eq!(staged.committed(), "ab");
        assert!(!staged.commit());
    }
}
