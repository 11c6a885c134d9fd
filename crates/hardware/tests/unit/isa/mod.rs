/// Field extraction and instruction decoding, including illegal encodings.
pub mod decode;
