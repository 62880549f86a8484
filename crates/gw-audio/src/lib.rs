// Acquisition, analyse spectrale et vote pour glasswatch.

pub mod capture;
pub mod classify;
pub mod decode;
pub mod energy;
pub mod fft;
pub mod normalize;
pub mod pipeline;
pub mod scheduler;
pub mod tone;
pub mod vote;
