//! Error chain for the legacy batch codec.
//!
//! Three domain kinds matter here: `CorruptRecord` (the reader gave up on a
//! buffer), `UnsupportedCodec` (a compression codec is unknown or its backing
//! library is unavailable) and `TypeError` (an argument had the wrong shape).
//! The last of these is mostly unreachable through the typed `append` API —
//! it exists so the error surface matches the source contract, not because
//! Rust callers can trigger it in the ordinary course of things.

error_chain! {
    foreign_links {
        Io(::std::io::Error);
    }

    errors {
        /// The reader found a CRC mismatch, a framing violation, or an
        /// otherwise impossible field while parsing a buffer.
        CorruptRecord(reason: String) {
            description("corrupt record")
            display("corrupt record: {}", reason)
        }

        /// The requested compression codec is unknown, or known but its
        /// backing implementation is unavailable.
        UnsupportedCodec(reason: String) {
            description("unsupported compression codec")
            display("{}", reason)
        }

        /// An argument passed to the builder had the wrong shape.
        TypeError(reason: String) {
            description("invalid argument type")
            display("{}", reason)
        }
    }
}
