//! Typed argument structures
//!
//! A handler's argument structure describes its fields through
//! [`CommandArgs`], normally generated by [`command_args!`](crate::command_args).
//! Each field type reports its flag kind through [`FieldType`]; types with no
//! flag kind are left out of the schema and always take their default value.

use crate::core::{
    binder::{BoundArgs, FieldSpec},
    coerce::{FieldKind, Value},
};
use std::{path::PathBuf, time::Duration};

/// Maps a Rust field type onto a flag kind
pub trait FieldType: Default {
    /// Flag kind, or `None` when the type cannot be bound from a flag
    const KIND: Option<FieldKind>;

    /// Extract a field value from a bound value of the matching kind
    fn from_value(value: &Value) -> Option<Self>;
}

impl FieldType for bool {
    const KIND: Option<FieldKind> = Some(FieldKind::Bool);

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FieldType for i64 {
    const KIND: Option<FieldKind> = Some(FieldKind::Int);

    fn from_value(value: &Value) -> Option<Self> {
        value.as_int()
    }
}

impl FieldType for String {
    const KIND: Option<FieldKind> = Some(FieldKind::String);

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

macro_rules! unsupported_field_types {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FieldType for $ty {
                const KIND: Option<FieldKind> = None;

                fn from_value(_: &Value) -> Option<Self> {
                    None
                }
            }
        )*
    };
}

unsupported_field_types!(
    i8, i16, i32, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, char, Duration, PathBuf,
);

impl<T> FieldType for Vec<T> {
    const KIND: Option<FieldKind> = None;

    fn from_value(_: &Value) -> Option<Self> {
        None
    }
}

impl<T> FieldType for Option<T> {
    const KIND: Option<FieldKind> = None;

    fn from_value(_: &Value) -> Option<Self> {
        None
    }
}

/// An argument structure a structured handler receives
pub trait CommandArgs: Sized {
    /// Declared fields, in declaration order
    fn fields() -> Vec<FieldSpec>;

    /// Build an instance from bound values
    fn from_bound(args: &BoundArgs) -> Self;
}

/// Declare an argument structure and derive its [`CommandArgs`] impl.
///
/// Each field may carry `flag`, `default` and `usage` options:
///
/// ```
/// commander::command_args! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub struct AcArgs {
///         pub temperature: i64 => { default: "22", usage: "Temperature in Celsius" },
///         pub fan_speed: i64 => { flag: "fanspeed", default: "3", usage: "Fan speed (1-5)" },
///         pub quiet: bool,
///     }
/// }
///
/// use commander::CommandArgs;
/// assert_eq!(AcArgs::fields().len(), 3);
/// ```
#[macro_export]
macro_rules! command_args {
    (@spec $field:ident, $ty:ty) => {
        $crate::FieldSpec::new(
            ::std::stringify!($field),
            <$ty as $crate::FieldType>::KIND,
        )
    };
    (@spec $field:ident, $ty:ty, $($key:ident : $val:expr),+) => {{
        let spec = $crate::command_args!(@spec $field, $ty);
        $( let spec = $crate::command_args!(@opt spec, $key, $val); )+
        spec
    }};
    (@opt $spec:ident, flag, $val:expr) => {
        $spec.with_flag($val)
    };
    (@opt $spec:ident, default, $val:expr) => {
        $spec.with_default($val)
    };
    (@opt $spec:ident, usage, $val:expr) => {
        $spec.with_usage($val)
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[doc = $doc:literal])*
                $fvis:vis $field:ident : $ty:ty $( => { $($key:ident : $val:expr),+ $(,)? } )?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[doc = $doc])*
                $fvis $field: $ty,
            )*
        }

        impl $crate::CommandArgs for $name {
            fn fields() -> ::std::vec::Vec<$crate::FieldSpec> {
                ::std::vec![
                    $( $crate::command_args!(@spec $field, $ty $(, $($key : $val),+)?) ),*
                ]
            }

            fn from_bound(args: &$crate::BoundArgs) -> Self {
                Self {
                    $( $field: args.field::<$ty>(::std::stringify!($field)), )*
                }
            }
        }
    };
}
