//! Optional rayon fan-out for independent work items.

/// Map `f` over `items`, on the rayon pool when `parallel` is set.
///
/// Output order always follows input order.
#[cfg(feature = "parallel")]
pub(crate) fn par_map<T, U, F>(items: &[T], parallel: bool, f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(usize, &T) -> U + Sync + Send,
{
    use rayon::prelude::*;

    if parallel && items.len() > 1 {
        items.par_iter().enumerate().map(|(i, item)| f(i, item)).collect()
    } else {
        items.iter().enumerate().map(|(i, item)| f(i, item)).collect()
    }
}

/// Map `f` over `items` in order.
#[cfg(not(feature = "parallel"))]
pub(crate) fn par_map<T, U, F>(items: &[T], _parallel: bool, f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(usize, &T) -> U + Sync + Send,
{
    items.iter().enumerate().map(|(i, item)| f(i, item)).collect()
}
