pub mod comparable_macros {
    /// Expands to the `as_any` and `as_any_mut` methods of a
    /// [`RawComparable`](crate::comparable::RawComparable) impl
    #[macro_export]
    macro_rules! any_accessors {
        () => {
            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }
        };
    }
}
