//! Wire messages exchanged between the participants of the torus.
//!
//! The message set is small and fixed, so the prost definitions are kept by
//! hand instead of being generated from a `.proto` file. Field numbers are part
//! of the wire format and must not be reused.

pub mod torus {
    /// Application tag carried by every message.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Tag {
        InitialElements = 0,
        Shift = 1,
        Result = 2,
    }

    /// Coordinator -> worker: the skewed pair a worker starts round zero with.
    #[derive(Clone, Copy, PartialEq, ::prost::Message)]
    pub struct InitialElements {
        #[prost(int64, tag = "1")]
        pub element_a: i64,
        #[prost(int64, tag = "2")]
        pub element_b: i64,
    }

    /// Worker -> ring neighbour: the pair being rotated one step.
    #[derive(Clone, Copy, PartialEq, ::prost::Message)]
    pub struct ShiftElements {
        #[prost(int64, tag = "1")]
        pub element_a: i64,
        #[prost(int64, tag = "2")]
        pub element_b: i64,
    }

    /// Worker -> coordinator: the accumulated dot product of one cell.
    #[derive(Clone, Copy, PartialEq, ::prost::Message)]
    pub struct PartialResult {
        #[prost(int64, tag = "1")]
        pub total: i64,
        #[prost(uint32, tag = "2")]
        pub origin_id: u32,
    }

    /// Framed unit on the wire.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Envelope {
        #[prost(uint32, tag = "1")]
        pub origin: u32,
        #[prost(enumeration = "Tag", tag = "2")]
        pub tag: i32,
        #[prost(oneof = "envelope::Body", tags = "3, 4, 5")]
        pub body: ::core::option::Option<envelope::Body>,
    }

    pub mod envelope {
        #[derive(Clone, Copy, PartialEq, ::prost::Oneof)]
        pub enum Body {
            #[prost(message, tag = "3")]
            InitialElements(super::InitialElements),
            #[prost(message, tag = "4")]
            ShiftElements(super::ShiftElements),
            #[prost(message, tag = "5")]
            PartialResult(super::PartialResult),
        }

        impl Body {
            pub fn kind(&self) -> &'static str {
                match self {
                    Body::InitialElements(_) => "InitialElements",
                    Body::ShiftElements(_) => "ShiftElements",
                    Body::PartialResult(_) => "PartialResult",
                }
            }
        }
    }

    pub use envelope::Body;
}
