//! Macros for declaring typed actor proxies.
//!
//! - [`actor_interface!`]: declare a remote actor interface once and get both
//!   its [`InterfaceDescriptor`](crate::InterfaceDescriptor) and a typed proxy
//!   struct with one async method per actor method.

/// Declare a remote actor interface.
///
/// Each method is prefixed with its verb: `get`, `post`, `put` or `delete` to
/// pin it, `call` to infer it (POST with an argument, GET without), or `host`
/// for lifecycle hooks that only run inside the hosted actor. A method takes at
/// most one argument, and a missing return type means the method returns
/// nothing.
///
/// # Example
///
/// ```rust
/// use dapr_runtime::actor_interface;
///
/// actor_interface! {
///     /// A remote counter
///     pub interface Counter as "CounterActor" {
///         get fn get_count() -> i64;
///         call fn increment(by: i64) -> i64;
///         delete fn reset();
///         host fn on_activation();
///     }
/// }
/// ```
///
/// Proxies are then obtained through the registry:
///
/// ```rust,ignore
/// let counter: Counter = proxies.get_typed("counter-1", None)?;
/// let value = counter.increment(2).await?;
/// ```
#[macro_export]
macro_rules! actor_interface {
    (@verb get) => { $crate::VerbHint::Get };
    (@verb post) => { $crate::VerbHint::Post };
    (@verb put) => { $crate::VerbHint::Put };
    (@verb delete) => { $crate::VerbHint::Delete };
    (@verb call) => { $crate::VerbHint::Inferred };
    (@verb host) => { $crate::VerbHint::Inferred };

    (@host host) => { true };
    (@host $other:ident) => { false };

    (@parameter $ty:ty) => { $crate::Parameter::by_value(stringify!($ty)) };
    (@parameter) => { $crate::Parameter::None };

    (@returns $ty:ty) => { $crate::ReturnType::of(stringify!($ty)) };
    (@returns) => { $crate::ReturnType::void() };

    (@output $ty:ty) => { $ty };
    (@output) => { () };

    (@argument $instance:expr, $method:expr, $arg:ident) => {
        $instance.call($method, Some(&$arg)).await
    };
    (@argument $instance:expr, $method:expr) => {
        $instance.call_without_args($method).await
    };

    (
        $(#[$meta:meta])*
        $vis:vis interface $name:ident $(as $dapr_type:literal)? {
            $(
                $(#[$method_meta:meta])*
                $verb:ident fn $method:ident ( $($arg:ident : $arg_ty:ty)? ) $(-> $ret:ty)? ;
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis struct $name {
            instance: ::std::sync::Arc<$crate::ActorInstance>,
        }

        impl $crate::ActorInterface for $name {
            fn descriptor() -> $crate::InterfaceDescriptor {
                $crate::InterfaceDescriptor::new(stringify!($name))
                    $(.with_dapr_type($dapr_type))?
                    $(
                        .with_method(
                            $crate::MethodDescriptor::new(stringify!($method))
                                .with_parameter_kind($crate::actor_interface!(@parameter $($arg_ty)?))
                                .with_return_type($crate::actor_interface!(@returns $($ret)?))
                                .with_verb($crate::actor_interface!(@verb $verb))
                                .host_only_if($crate::actor_interface!(@host $verb))
                        )
                    )*
            }

            fn from_instance(instance: ::std::sync::Arc<$crate::ActorInstance>) -> Self {
                Self { instance }
            }
        }

        impl $name {
            pub fn instance(&self) -> &::std::sync::Arc<$crate::ActorInstance> {
                &self.instance
            }

            pub fn get_id(&self) -> &str {
                self.instance.get_id()
            }

            $(
                $(#[$method_meta])*
                pub async fn $method(
                    &self $(, $arg: $arg_ty)?
                ) -> ::std::result::Result<$crate::actor_interface!(@output $($ret)?), $crate::ProxyError> {
                    $crate::actor_interface!(@argument self.instance, stringify!($method) $(, $arg)?)
                }
            )*
        }
    };
}
