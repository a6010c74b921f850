use crate::event::Picked;

/// Candidates waiting for the user to pick one
#[derive(Debug, Clone, PartialEq)]
pub struct Chooser {
    pub candidates: Vec<Picked>,
    /// Time the chooser opened, in the viewport clock's seconds
    pub opened_at: f64,
}

impl Chooser {
    pub fn new(candidates: Vec<Picked>, opened_at: f64) -> Self {
        Self {
            candidates,
            opened_at,
        }
    }

    pub fn is_expired(&self, now: f64, timeout: f64) -> bool {
        now - self.opened_at >= timeout
    }

    pub fn get(&self, index: usize) -> Option<Picked> {
        self.candidates.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_expiry() {
        let chooser = Chooser::new(vec![Picked::Element(Uuid::nil())], 2.0);
        assert!(!chooser.is_expired(5.0, 10.0));
        assert!(chooser.is_expired(12.0, 10.0));
        assert_eq!(chooser.get(1), None);
    }
}
