use super::{Segment, TimedTextEntry};
use crate::time::{Placement, TimeWindow};

/// Lazily yields segments for entries overlapping a window.
///
/// Entries must arrive in non-decreasing start order: the first entry that
/// starts after the window ends the scan.
pub struct OverlapFilter<I> {
    entries: I,
    window: TimeWindow,
    done: bool,
}

impl<I> OverlapFilter<I> {
    pub fn new(entries: I, window: TimeWindow) -> Self {
        Self {
            entries,
            window,
            done: window.is_inverted(),
        }
    }
}

impl<'a, I> Iterator for OverlapFilter<I>
where
    I: Iterator<Item = &'a TimedTextEntry>,
{
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        if self.done {
            return None;
        }

        for entry in self.entries.by_ref() {
            match self.window.place(entry.start_offset, entry.duration) {
                Placement::Before => continue,
                Placement::Overlaps => return Some(Segment::from_entry(entry)),
                Placement::After => break,
            }
        }

        self.done = true;
        None
    }
}

impl<'a, I> std::iter::FusedIterator for OverlapFilter<I> where I: Iterator<Item = &'a TimedTextEntry> {}

pub fn select_segments<'a, T>(entries: T, window: TimeWindow) -> OverlapFilter<T::IntoIter>
where
    T: IntoIterator<Item = &'a TimedTextEntry>,
{
    OverlapFilter::new(entries.into_iter(), window)
}
