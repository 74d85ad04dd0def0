//! Helper macro generating port error enums with `thiserror` messages and
//! snake_case constructors taking `impl Into<_>` arguments.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("Build [`Self::", stringify!($variant), "`].")]
            #[must_use]
            pub const fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            #[doc = concat!("Build [`Self::", stringify!($variant), "`] from its fields.")]
            #[must_use]
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
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
                $variant $( {
                    $(
                        #[doc = concat!("Reported `", stringify!($field), "`.")]
                        $field : $ty
                    ),*
                } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    define_port_error! {
        pub enum StubStoreError {
            Missing { id: String } => "missing: {id}",
            Busy { attempts: u32 } => "busy after {attempts} attempts",
            Rejected { id: String, attempts: u32 } => "rejected {id} ({attempts})",
            Offline => "offline",
        }
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = StubStoreError::missing("abc");
        assert_eq!(err.to_string(), "missing: abc");
    }

    #[test]
    fn constructors_preserve_non_string_types() {
        let err = StubStoreError::busy(3_u32);
        assert_eq!(err.to_string(), "busy after 3 attempts");
    }

    #[test]
    fn constructors_support_mixed_fields() {
        let err = StubStoreError::rejected("abc", 2_u32);
        assert_eq!(err.to_string(), "rejected abc (2)");
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(StubStoreError::offline(), StubStoreError::Offline);
    }
}
