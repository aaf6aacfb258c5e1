use crate::logic::board::Location;

/// Each player owns seven tiles, so no roll can offer more origins than that.
pub const MAX_POSSIBLE_MOVES: usize = 7;

/// Fixed-capacity list of move origins, reused across searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveList {
    moves: [Location; MAX_POSSIBLE_MOVES],
    count: usize,
}

impl Default for MoveList {
    fn default() -> Self {
        Self {
            moves: [Location::default(); MAX_POSSIBLE_MOVES],
            count: 0,
        }
    }
}

impl MoveList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, from: Location) {
        if let Some(slot) = self.moves.get_mut(self.count) {
            *slot = from;
            self.count += 1;
        } else {
            debug_assert!(false, "MoveList overflow, capacity {MAX_POSSIBLE_MOVES}");
        }
    }

    pub const fn clear(&mut self) {
        self.count = 0;
    }

    pub const fn len(&self) -> usize {
        self.count
    }

    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn as_slice(&self) -> &[Location] {
        self.moves.get(..self.count).unwrap_or(&[])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Location> {
        self.as_slice().iter()
    }

    pub fn get(&self, index: usize) -> Option<Location> {
        self.as_slice().get(index).copied()
    }

    pub fn contains(&self, from: Location) -> bool {
        self.as_slice().contains(&from)
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Location;
    type IntoIter = std::slice::Iter<'a, Location>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_clear() {
        let mut list = MoveList::new();
        assert!(list.is_empty());
        list.push(Location::new(0, 4));
        list.push(Location::new(1, 2));
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(1), Some(Location::new(1, 2)));
        assert!(list.contains(Location::new(0, 4)));
        assert_eq!(list.get(2), None);

        list.clear();
        assert!(list.is_empty());
        assert!(!list.contains(Location::new(0, 4)));
        assert_eq!(list.iter().count(), 0);
    }

    #[test]
    fn test_fills_to_capacity() {
        let mut list = MoveList::new();
        for y in 0..7 {
            list.push(Location::new(1, y));
        }
        assert_eq!(list.len(), MAX_POSSIBLE_MOVES);
        let ys: Vec<u8> = (&list).into_iter().map(|loc| loc.y).collect();
        assert_eq!(ys, vec![0, 1, 2, 3, 4, 5, 6]);
    }
}
