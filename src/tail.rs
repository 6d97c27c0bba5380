use std::collections::VecDeque;

/// Window over a sequence selected by a signed count.
///
/// Returned by [`tail_filter`].
pub enum Tail<I: Iterator> {
    All(I),
    Head(std::iter::Take<I>),
    Last(std::collections::vec_deque::IntoIter<I::Item>),
}

impl<I: Iterator> Iterator for Tail<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::All(it) => it.next(),
            Self::Head(it) => it.next(),
            Self::Last(it) => it.next(),
        }
    }
}

/// Keep everything (`n == 0`), the last `n` items (`n > 0`) or the first
/// `-n` items (`n < 0`), in their original order.
///
/// The head case stops pulling from `items` after `-n` items. The tail case
/// has to drain `items` but holds at most `n` of them at a time.
pub fn tail_filter<I>(items: I, n: i64) -> Tail<I::IntoIter>
where
    I: IntoIterator,
{
    let iter = items.into_iter();
    match n {
        0 => Tail::All(iter),
        n if n < 0 => Tail::Head(iter.take(usize::try_from(n.unsigned_abs()).unwrap_or(usize::MAX))),
        n => {
            let cap = usize::try_from(n).unwrap_or(usize::MAX);
            let mut ring = VecDeque::with_capacity(cap.min(1024));
            for item in iter {
                if ring.len() == cap {
                    ring.pop_front();
                }
                ring.push_back(item);
            }
            Tail::Last(ring.into_iter())
        }
    }
}
