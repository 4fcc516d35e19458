//! Tests for chain links.

#[cfg(test)]
mod tests {
    use crate::combo::components::chain::ChainLink;

    #[test]
    fn dequeue_follows_template_order() {
        let mut link = ChainLink::new(vec![3, 1, 4]);
        assert_eq!(link.remaining(), 3);
        assert_eq!(link.dequeue(), Some(3));
        assert_eq!(link.dequeue(), Some(1));
        assert_eq!(link.dequeue(), Some(4));
        assert_eq!(link.dequeue(), None);
        assert!(link.is_empty());
    }

    #[test]
    fn reset_restores_count_after_partial_consumption() {
        let mut link = ChainLink::new(vec![0, 1, 2]);
        link.dequeue();
        link.has_finished = false;
        assert_eq!(link.remaining(), 2);

        link.reset();
        assert_eq!(link.remaining(), link.template_len());
        assert_eq!(link.dequeue(), Some(0));
        assert!(link.has_finished);
    }

    #[test]
    fn reset_restores_count_after_total_consumption() {
        let mut link = ChainLink::new(vec![0, 1]);
        while link.dequeue().is_some() {}

        link.reset();
        assert_eq!(link.remaining(), 2);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut link = ChainLink::new(vec![5, 6]);
        link.reset();
        link.reset();
        assert_eq!(link.remaining(), 2);
        assert_eq!(link.template(), &[5, 6]);
    }

    #[test]
    fn empty_link_stays_empty() {
        let mut link = ChainLink::new(Vec::new());
        assert!(link.is_empty());
        link.reset();
        assert!(link.is_empty());
        assert_eq!(link.dequeue(), None);
    }
}
