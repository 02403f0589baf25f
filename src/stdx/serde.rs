use serde::{self, Deserializer};

macro_rules! number_from_string {
    ($name:ident, $ty:ty, $expecting:literal) => {
        pub fn $name<'de, D>(deserializer: D) -> Result<$ty, D::Error>
        where
            D: Deserializer<'de>,
        {
            struct Visitor;

            impl serde::de::Visitor<'_> for Visitor {
                type Value = $ty;

                fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str($expecting)
                }

                fn visit_u64<E>(self, v: u64) -> Result<$ty, E>
                where
                    E: serde::de::Error,
                {
                    <$ty>::try_from(v).map_err(E::custom)
                }

                fn visit_i64<E>(self, v: i64) -> Result<$ty, E>
                where
                    E: serde::de::Error,
                {
                    <$ty>::try_from(v).map_err(E::custom)
                }

                fn visit_str<E>(self, v: &str) -> Result<$ty, E>
                where
                    E: serde::de::Error,
                {
                    v.trim().parse::<$ty>().map_err(E::custom)
                }
            }

            deserializer.deserialize_any(Visitor)
        }
    };
}

number_from_string!(u32_from_string, u32, "u32 or string containing a u32");
number_from_string!(u64_from_string, u64, "u64 or string containing a u64");

/// Ratings come back as `"4.52"` from the metadata API, but as bare numbers from
/// the rating API.
pub fn f32_from_string<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;

    impl serde::de::Visitor<'_> for Visitor {
        type Value = f32;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("f32 or string containing an f32")
        }

        #[allow(clippy::cast_possible_truncation)]
        fn visit_f64<E>(self, v: f64) -> Result<f32, E>
        where
            E: serde::de::Error,
        {
            Ok(v as f32)
        }

        #[allow(clippy::cast_precision_loss)]
        fn visit_u64<E>(self, v: u64) -> Result<f32, E>
        where
            E: serde::de::Error,
        {
            Ok(v as f32)
        }

        #[allow(clippy::cast_precision_loss)]
        fn visit_i64<E>(self, v: i64) -> Result<f32, E>
        where
            E: serde::de::Error,
        {
            Ok(v as f32)
        }

        fn visit_str<E>(self, v: &str) -> Result<f32, E>
        where
            E: serde::de::Error,
        {
            v.trim().parse::<f32>().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(Visitor)
}
