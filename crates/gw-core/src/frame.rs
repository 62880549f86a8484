/// Bloc d'échantillons bruts. Pré-alloué, réécrit en place à chaque sous-fenêtre.
///
/// La longueur est fixée à la construction et ne change jamais ensuite.
///
/// # Example
/// ```
/// use gw_core::frame::Frame;
/// let mut frame = Frame::new(1024);
/// frame.samples_mut()[0] = 42;
/// assert_eq!(frame.len(), 1024);
/// assert_eq!(frame.samples()[0], 42);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    samples: Box<[i32]>,
}

impl Frame {
    /// Crée une frame de `len` échantillons à zéro.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            samples: vec![0; len].into_boxed_slice(),
        }
    }

    /// Raw samples.
    #[inline(always)]
    #[must_use]
    pub fn samples(&self) -> &[i32] {
        &self.samples
    }

    /// Raw samples, for the source to overwrite.
    #[inline(always)]
    pub fn samples_mut(&mut self) -> &mut [i32] {
        &mut self.samples
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// `true` for a zero-length frame.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Frame convertie en flottants dans [-1, 1]. Même longueur que la [`Frame`] source.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedFrame {
    samples: Box<[f32]>,
}

impl NormalizedFrame {
    /// Pre-allocate `len` zeroed samples.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            samples: vec![0.0; len].into_boxed_slice(),
        }
    }

    /// Normalized samples.
    #[inline(always)]
    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Normalized samples, for the normalizer to overwrite.
    #[inline(always)]
    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// `true` for a zero-length frame.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// One-sided magnitude spectrum of a frame: `frame_size / 2` non-negative bins.
///
/// # Example
/// ```
/// use gw_core::frame::Spectrum;
/// let spectrum = Spectrum::new(1024);
/// assert_eq!(spectrum.len(), 512);
/// assert_eq!(spectrum.argmax(), (0, 0.0));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Spectrum {
    bins: Box<[f32]>,
}

impl Spectrum {
    /// Pre-allocate the spectrum for a frame of `frame_size` samples.
    #[must_use]
    pub fn new(frame_size: usize) -> Self {
        Self {
            bins: vec![0.0; frame_size / 2].into_boxed_slice(),
        }
    }

    /// Magnitudes.
    #[inline(always)]
    #[must_use]
    pub fn bins(&self) -> &[f32] {
        &self.bins
    }

    /// Magnitudes, for the transform to overwrite.
    #[inline(always)]
    pub fn bins_mut(&mut self) -> &mut [f32] {
        &mut self.bins
    }

    /// Number of bins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    /// `true` if there are no bins.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Index and value of the largest bin.
    ///
    /// The first maximum wins. An all-zero spectrum yields `(0, 0.0)`.
    #[must_use]
    pub fn argmax(&self) -> (usize, f32) {
        let mut max_bin = 0;
        let mut max_value = 0.0f32;
        for (i, &value) in self.bins.iter().enumerate() {
            if value > max_value {
                max_value = value;
                max_bin = i;
            }
        }
        (max_bin, max_value)
    }
}

/// Frequency in whole Hz of `bin` for a `frame_size`-point transform at `sample_rate`.
///
/// Integer floor, matching how band boundaries are compared.
///
/// # Example
/// ```
/// use gw_core::frame::bin_frequency;
/// assert_eq!(bin_frequency(187, 16447, 1024), 3003);
/// assert_eq!(bin_frequency(0, 16447, 1024), 0);
/// ```
#[inline(always)]
#[must_use]
pub fn bin_frequency(bin: usize, sample_rate: u32, frame_size: usize) -> u32 {
    if frame_size == 0 {
        return 0;
    }
    (bin as u64 * u64::from(sample_rate) / frame_size as u64) as u32
}
