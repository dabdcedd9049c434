//! Splitting of work slices

/// Splits a slice into consecutive immutable sub-slices.
/// 
/// ```
/// use asqp_core::splitm;
/// 
/// let work = [0.; 5];
/// splitm!(work, (a; 2), (b; 3));
/// assert_eq!(a.len(), 2);
/// assert_eq!(b.len(), 3);
/// ```
/// Panics if the slice is shorter than the sum of lengths.
#[macro_export]
macro_rules! splitm {
    ($slice:expr, $( ($var:ident; $len:expr) ),+ ) => {
        let (_, _splitm_rest) = $slice.split_at(0);
        $(
            let ($var, _splitm_rest) = _splitm_rest.split_at($len);
        )*
        let _ = _splitm_rest;
    };
}

/// Splits a slice into consecutive mutable sub-slices.
/// 
/// Same as [`splitm!`] but each sub-slice is `&mut`.
#[macro_export]
macro_rules! splitm_mut {
    ($slice:expr, $( ($var:ident; $len:expr) ),+ ) => {
        let (_, _splitm_rest) = $slice.split_at_mut(0);
        $(
            let ($var, _splitm_rest) = _splitm_rest.split_at_mut($len);
        )*
        let _ = _splitm_rest;
    };
}
