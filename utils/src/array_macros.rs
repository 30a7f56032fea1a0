/// Generates a getter that returns a `Vec<T>` field as an `Array1<T>`.
///
/// Meant to be called inside an `impl` block. The field may be nested
/// (`spline.xa`).
#[macro_export]
macro_rules! array1D_getter_impl {
    ($fun_name:ident, $($field:ident).+, $t:ty) => {
        #[doc = concat!("Returns the `", stringify!($fun_name), "` data as a 1D array.")]
        pub fn $fun_name(&self) -> Array1<$t> {
            Array1::from(self.$($field).+.to_vec())
        }
    };
}

/// Generates a getter that returns an `Array2<T>` field as an owned copy.
///
/// Meant to be called inside an `impl` block.
#[macro_export]
macro_rules! array2D_getter_impl {
    ($fun_name:ident, $($field:ident).+, $t:ty) => {
        #[doc = concat!("Returns the `", stringify!($fun_name), "` data as a 2D array.")]
        pub fn $fun_name(&self) -> Array2<$t> {
            self.$($field).+.clone()
        }
    };
}
