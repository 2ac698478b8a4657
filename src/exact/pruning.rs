use super::PruningStrategy;

/// Search state whose candidates have to meet a degree requirement. A "violator" is a
/// candidate that cannot be part of any solution the search is still interested in.
pub trait Peelable {
    type Item: Copy;

    /// Appends every current violator to `out`
    fn collect_violators(&self, out: &mut Vec<Self::Item>);

    /// Returns true iff `item` is still a candidate and violates the requirement
    fn is_violator(&self, item: Self::Item) -> bool;

    /// Removes the candidate `item` and appends the candidates whose requirement may have
    /// become violated by the removal to `affected`
    fn remove_violator(&mut self, item: Self::Item, affected: &mut Vec<Self::Item>);
}

impl PruningStrategy {
    /// Removes violators from `state` according to the strategy and returns their number.
    /// `buffer` is scratch space and left empty.
    pub fn peel<P: Peelable>(self, state: &mut P, buffer: &mut Vec<P::Item>) -> usize {
        buffer.clear();
        let mut removed = 0;

        match self {
            Self::SinglePass => {
                state.collect_violators(buffer);
                let mut ignored = Vec::new();
                for item in buffer.drain(..) {
                    if state.is_violator(item) {
                        state.remove_violator(item, &mut ignored);
                        ignored.clear();
                        removed += 1;
                    }
                }
            }

            Self::FixedPointSweep => {
                let mut ignored = Vec::new();
                loop {
                    state.collect_violators(buffer);
                    if buffer.is_empty() {
                        break;
                    }
                    for item in buffer.drain(..) {
                        if state.is_violator(item) {
                            state.remove_violator(item, &mut ignored);
                            ignored.clear();
                            removed += 1;
                        }
                    }
                }
            }

            Self::QueueBased => {
                state.collect_violators(buffer);
                while let Some(item) = buffer.pop() {
                    if state.is_violator(item) {
                        state.remove_violator(item, buffer);
                        removed += 1;
                    }
                }
            }
        }

        removed
    }
}
