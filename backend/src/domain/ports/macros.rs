//! Helper macro for declaring driven-port error enums.
//!
//! `define_port_error!` derives `thiserror::Error` for the enum and adds a
//! snake_case constructor per variant. String-like fields accept anything
//! `Into<T>`, so adapters can write `RepoError::query(err.to_string())` or
//! `RepoError::query("literal")`.

macro_rules! define_port_error {
    (@constructor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@constructor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@collect $variant () () $( $field : $ty, )*);
    };

    (@collect $variant:ident ($($params:tt)*) ($($fields:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($fields)* }
            }
        }
    };

    (@collect $variant:ident ($($params:tt)*) ($($fields:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @collect
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($fields)* $field: $field.into(),)
            $($rest)*
        );
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@constructor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;
