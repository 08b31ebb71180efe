pub mod capture;
pub mod encode;

pub use capture::{AudioBlock, CaptureBackend, ChannelBackend, WavFileBackend};
pub use encode::{encode_wav, pcm16_frame, sample_to_i16};
