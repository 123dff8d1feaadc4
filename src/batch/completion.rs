//! Completion predicates deciding whether a work item can be skipped.

use crate::batch::item::WorkItem;

/// Decides whether a work item has already been completed by an earlier run.
pub trait CompletionCheck: Send + Sync {
    /// Returns true if `item` needs no further work.
    fn is_complete(&self, item: &WorkItem) -> bool;
}

/// Treats an item as complete when its output file exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputExists;

impl CompletionCheck for OutputExists {
    fn is_complete(&self, item: &WorkItem) -> bool {
        item.output.exists()
    }
}

impl<F> CompletionCheck for F
where
    F: Fn(&WorkItem) -> bool + Send + Sync,
{
    fn is_complete(&self, item: &WorkItem) -> bool {
        self(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::item::RunMode;

    #[test]
    fn test_output_exists() {
        let dir = tempfile::tempdir().unwrap();
        let item = WorkItem::new(1, "cake.jpg", dir.path(), RunMode::Full);
        assert!(!OutputExists.is_complete(&item));

        std::fs::write(&item.output, b"png").unwrap();
        assert!(OutputExists.is_complete(&item));
    }

    #[test]
    fn test_closure_predicate() {
        let item = WorkItem::new(1, "cake.jpg", std::path::Path::new("o"), RunMode::Full);
        let done = |item: &WorkItem| item.index == 1;
        assert!(done.is_complete(&item));
    }
}
