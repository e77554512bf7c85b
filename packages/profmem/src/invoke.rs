/// A callable that can be invoked with its arguments packed into a tuple.
///
/// This is what lets the wrapper types forward arbitrary argument lists to the function they
/// wrap: a function taking `(a: u32, b: &str)` is invoked with the tuple `(a, b)`, a function
/// taking no arguments with `()`. It is implemented for every [`Fn`] with up to eight arguments.
///
/// # Examples
///
/// ```
/// use profmem::Invoke;
///
/// fn add(a: u32, b: u32) -> u32 {
///     a + b
/// }
///
/// assert_eq!(add.invoke((2, 3)), 5);
/// assert_eq!((|| "hello").invoke(()), "hello");
/// ```
pub trait Invoke<Args> {
    /// The return type of the callable.
    type Output;

    /// Calls the callable with the unpacked arguments.
    fn invoke(&self, args: Args) -> Self::Output;
}

macro_rules! impl_invoke {
    ($($arg:ident),*) => {
        impl<Func, Ret, $($arg),*> Invoke<($($arg,)*)> for Func
        where
            Func: Fn($($arg),*) -> Ret,
        {
            type Output = Ret;

            #[inline]
            #[allow(
                non_snake_case,
                reason = "the type parameter names double as argument bindings"
            )]
            fn invoke(&self, ($($arg,)*): ($($arg,)*)) -> Ret {
                self($($arg),*)
            }
        }
    };
}

impl_invoke!();
impl_invoke!(A1);
impl_invoke!(A1, A2);
impl_invoke!(A1, A2, A3);
impl_invoke!(A1, A2, A3, A4);
impl_invoke!(A1, A2, A3, A4, A5);
impl_invoke!(A1, A2, A3, A4, A5, A6);
impl_invoke!(A1, A2, A3, A4, A5, A6, A7);
impl_invoke!(A1, A2, A3, A4, A5, A6, A7, A8);
