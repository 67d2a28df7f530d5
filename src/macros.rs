/// Declare the reactive mirror of the chart host in one place: the `Globals`
/// struct, its lazily created instance and one accessor per signal.
///
/// Usage:
/// `host_signals! {
///     is_animating: bool = false,
///     last_error: Option<String> = None,
/// }`
#[macro_export]
macro_rules! host_signals {
    ( $( $name:ident : $ty:ty = $default:expr ),+ $(,)? ) => {
        pub struct Globals {
            $( pub $name: ::leptos::RwSignal<$ty>, )+
        }

        static GLOBALS: ::once_cell::sync::OnceCell<Globals> = ::once_cell::sync::OnceCell::new();

        pub fn globals() -> &'static Globals {
            GLOBALS.get_or_init(|| Globals {
                $( $name: ::leptos::create_rw_signal($default), )+
            })
        }

        $(
            pub fn $name() -> ::leptos::RwSignal<$ty> {
                globals().$name
            }
        )+
    };
}
