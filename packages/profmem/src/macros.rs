/// Measures the rest of the enclosing block as an activation of a profiled function.
///
/// Expands to a [`ProfiledScope`][crate::ProfiledScope] that must be bound to a variable; the
/// activation ends when it is dropped. Without arguments the activation is named after the
/// enclosing function, otherwise after the given name. The location is the macro call site.
///
/// Only recorded while a profiling session is active on the current thread, e.g. inside a
/// function wrapped with [`profile_with_memory_usage()`][crate::profile_with_memory_usage()].
///
/// # Examples
///
/// ```
/// fn load_config(path: &str) -> usize {
///     let _scope = profmem::profile_scope!();
///     path.len()
/// }
///
/// fn validate(entries: &[u32]) -> bool {
///     let _scope = profmem::profile_scope!("validate entries");
///     entries.iter().all(|e| *e > 0)
/// }
///
/// let checked = profmem::ProfiledMemoryUsage::new(|| {
///     load_config("app.toml") > 0 && validate(&[1, 2, 3])
/// });
///
/// assert!(checked.call(()));
/// ```
#[macro_export]
macro_rules! profile_scope {
    () => {
        $crate::enter($crate::FunctionId::new(::core::file!(), ::core::line!(), {
            fn __profmem_marker() {}
            $crate::__private::enclosing_function_name(::core::any::type_name_of_val(
                &__profmem_marker,
            ))
        }))
    };
    ($name:expr) => {
        $crate::enter($crate::FunctionId::new(
            ::core::file!(),
            ::core::line!(),
            $name,
        ))
    };
}
