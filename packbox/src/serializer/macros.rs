// SPDX-License-Identifier: MIT
//! Static schema registration for composites and enumerations

/// Implement [`Wire`](crate::serializer::Wire) for a struct.
///
/// The struct is declared separately; the macro only registers its member
/// order (positional) or tag table (tagged). `nullable` marks a reference
/// composite, written behind a presence byte; such types must implement
/// `Default`, which is what a null reads as. Tagged types must implement
/// `Default` too, since members absent on the wire keep their default.
///
/// ```
/// use packbox::wire_record;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Pair {
///     key: String,
///     count: i32,
/// }
///
/// wire_record! {
///     tagged nullable Pair {
///         0 => key,
///         1 => count,
///     }
/// }
///
/// let pair = Pair { key: "a".into(), count: 2 };
/// let bytes = packbox::serializer::to_bytes(&pair).unwrap();
/// assert_eq!(packbox::serializer::from_bytes::<Pair>(&bytes).unwrap(), pair);
/// ```
#[macro_export]
macro_rules! wire_record {
    (positional nullable $ty:ident { $($field:ident),* $(,)? }) => {
        $crate::wire_record!(@positional $ty, true, $($field),*);
    };
    (positional $ty:ident { $($field:ident),* $(,)? }) => {
        $crate::wire_record!(@positional $ty, false, $($field),*);
    };
    (tagged nullable $ty:ident { $($tag:literal => $field:ident),* $(,)? }) => {
        $crate::wire_record!(@tagged $ty, true, $($tag => $field),*);
    };
    (tagged $ty:ident { $($tag:literal => $field:ident),* $(,)? }) => {
        $crate::wire_record!(@tagged $ty, false, $($tag => $field),*);
    };

    (@null_value true) => {
        fn null_value() -> ::std::option::Option<Self> {
            ::std::option::Option::Some(<Self as ::std::default::Default>::default())
        }
    };
    (@null_value false) => {};

    (@positional $ty:ident, $nullable:tt, $($field:ident),*) => {
        impl $crate::serializer::Wire for $ty {
            const NULLABLE: bool = $nullable;

            fn write_body<W: ::std::io::Write>(
                &self,
                w: &mut $crate::serializer::BinaryWriter<W>,
            ) -> ::std::result::Result<(), $crate::error::SerializeError> {
                $( $crate::serializer::Wire::write(&self.$field, w)?; )*
                let _ = w;
                ::std::result::Result::Ok(())
            }

            fn read_body<R: ::std::io::BufRead>(
                r: &mut $crate::serializer::BinaryReader<R>,
            ) -> ::std::result::Result<Self, $crate::error::SerializeError> {
                let _ = &r;
                ::std::result::Result::Ok(Self {
                    $( $field: $crate::serializer::Wire::read(r)?, )*
                })
            }

            fn shape() -> $crate::serializer::Shape {
                $crate::serializer::Shape::Composite(::std::boxed::Box::new(
                    $crate::serializer::CompositeShape {
                        name: stringify!($ty).to_string(),
                        strategy: $crate::serializer::Strategy::Positional,
                        nullable: $nullable,
                        members: vec![
                            $(
                                $crate::serializer::Member::positional(
                                    stringify!($field),
                                    $crate::serializer::field_shape(|v: &$ty| &v.$field),
                                ),
                            )*
                        ],
                    },
                ))
            }

            $crate::wire_record!(@null_value $nullable);
        }
    };

    (@tagged $ty:ident, $nullable:tt, $($tag:literal => $field:ident),*) => {
        impl $crate::serializer::Wire for $ty {
            const NULLABLE: bool = $nullable;

            fn write_body<W: ::std::io::Write>(
                &self,
                w: &mut $crate::serializer::BinaryWriter<W>,
            ) -> ::std::result::Result<(), $crate::error::SerializeError> {
                $(
                    w.write_tag($tag)?;
                    $crate::serializer::Wire::write(&self.$field, w)?;
                )*
                w.write_sentinel()
            }

            fn read_body<R: ::std::io::BufRead>(
                r: &mut $crate::serializer::BinaryReader<R>,
            ) -> ::std::result::Result<Self, $crate::error::SerializeError> {
                let mut value = <Self as ::std::default::Default>::default();
                loop {
                    match r.read_tag()? {
                        $crate::serializer::SENTINEL_TAG => break,
                        $( $tag => value.$field = $crate::serializer::Wire::read(r)?, )*
                        tag => {
                            return ::std::result::Result::Err(
                                $crate::error::SerializeError::UnknownTag {
                                    record: stringify!($ty).to_string(),
                                    tag,
                                },
                            )
                        }
                    }
                }
                ::std::result::Result::Ok(value)
            }

            fn shape() -> $crate::serializer::Shape {
                $crate::serializer::Shape::Composite(::std::boxed::Box::new(
                    $crate::serializer::CompositeShape {
                        name: stringify!($ty).to_string(),
                        strategy: $crate::serializer::Strategy::Tagged,
                        nullable: $nullable,
                        members: vec![
                            $(
                                $crate::serializer::Member::tagged(
                                    stringify!($field),
                                    $tag,
                                    $crate::serializer::field_shape(|v: &$ty| &v.$field),
                                ),
                            )*
                        ],
                    },
                ))
            }

            $crate::wire_record!(@null_value $nullable);
        }
    };
}

/// Declare a field-less enum with an integer wire representation.
///
/// The enum is written as its discriminant in the given width. Decoding an
/// undeclared discriminant fails with `InvalidEnum`. The declared enum is
/// always `Clone + Copy`.
///
/// ```
/// packbox::wire_enum! {
///     #[derive(Debug, PartialEq)]
///     pub enum Facing: i32 {
///         North = 0,
///         South = 1,
///     }
/// }
///
/// let bytes = packbox::serializer::to_bytes(&Facing::South).unwrap();
/// assert_eq!(bytes, vec![1, 0, 0, 0]);
/// ```
#[macro_export]
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $repr:ty {
            $( $(#[$vmeta:meta])* $variant:ident = $value:expr ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy)]
        #[repr($repr)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant = $value, )*
        }

        impl $name {
            /// Every declared variant, in declaration order
            pub const ALL: &'static [$name] = &[ $( $name::$variant, )* ];

            pub fn from_repr(raw: $repr) -> ::std::option::Option<Self> {
                $(
                    if raw == $name::$variant as $repr {
                        return ::std::option::Option::Some($name::$variant);
                    }
                )*
                ::std::option::Option::None
            }
        }

        impl $crate::serializer::Wire for $name {
            fn write_body<W: ::std::io::Write>(
                &self,
                w: &mut $crate::serializer::BinaryWriter<W>,
            ) -> ::std::result::Result<(), $crate::error::SerializeError> {
                w.write_primitive(*self as $repr)
            }

            fn read_body<R: ::std::io::BufRead>(
                r: &mut $crate::serializer::BinaryReader<R>,
            ) -> ::std::result::Result<Self, $crate::error::SerializeError> {
                let raw: $repr = r.read_primitive()?;
                $name::from_repr(raw).ok_or($crate::error::SerializeError::InvalidEnum {
                    name: stringify!($name),
                    value: raw as i64,
                })
            }

            fn shape() -> $crate::serializer::Shape {
                $crate::serializer::Shape::Enum {
                    name: stringify!($name).to_string(),
                    repr: ::std::boxed::Box::new(
                        <$repr as $crate::serializer::Wire>::shape(),
                    ),
                }
            }
        }
    };
}
