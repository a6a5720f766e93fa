//! Tensor sinks: hand the training data to whatever trains the model
//!
//! A sink receives the one-hot contexts, shape
//! (num_sequences, window_width, vocabulary_size), and the targets, shape
//! (num_sequences,). `MemorySink` keeps dense tensors in memory; `NpySink`
//! streams NumPy `.npy` files without materializing the one-hot tensor.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::corpus::{CategoricalTensor, OneHot};
use crate::error::{PipelineError, Result};

/// Capability: accept categorical inputs and integer targets
pub trait TensorSink {
    fn write(&mut self, inputs: OneHot<'_>, targets: &[usize]) -> Result<()>;
}

/// Keeps the dense tensors, mostly for tests and small corpora
#[derive(Debug, Default)]
pub struct MemorySink {
    pub inputs: Option<CategoricalTensor>,
    pub targets: Vec<i64>,
}

impl TensorSink for MemorySink {
    fn write(&mut self, inputs: OneHot<'_>, targets: &[usize]) -> Result<()> {
        self.inputs = Some(inputs.to_dense());
        self.targets = targets.iter().map(|&t| t as i64).collect();
        Ok(())
    }
}

/// Writes `inputs.npy` (float32) and `targets.npy` (int64) into a directory
#[derive(Debug, Clone)]
pub struct NpySink {
    dir: PathBuf,
}

impl NpySink {
    pub const INPUTS_FILE: &'static str = "inputs.npy";
    pub const TARGETS_FILE: &'static str = "targets.npy";

    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn inputs_path(&self) -> PathBuf {
        self.dir.join(Self::INPUTS_FILE)
    }

    pub fn targets_path(&self) -> PathBuf {
        self.dir.join(Self::TARGETS_FILE)
    }

    fn write_inputs(&self, inputs: OneHot<'_>) -> std::io::Result<()> {
        let shape = inputs.shape();
        let classes = shape[2];
        let mut out = BufWriter::new(File::create(self.inputs_path())?);
        write_npy_header(&mut out, "<f4", &shape)?;

        let one = 1.0f32.to_le_bytes();
        let mut row = vec![0u8; classes * 4];
        for hot in inputs.hot_indices() {
            row[hot * 4..hot * 4 + 4].copy_from_slice(&one);
            out.write_all(&row)?;
            row[hot * 4..hot * 4 + 4].fill(0);
        }
        out.flush()
    }

    fn write_targets(&self, targets: &[usize]) -> std::io::Result<()> {
        let mut out = BufWriter::new(File::create(self.targets_path())?);
        write_npy_header(&mut out, "<i8", &[targets.len()])?;
        for &target in targets {
            out.write_all(&(target as i64).to_le_bytes())?;
        }
        out.flush()
    }
}

impl TensorSink for NpySink {
    fn write(&mut self, inputs: OneHot<'_>, targets: &[usize]) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| PipelineError::io(&self.dir, e))?;
        self.write_inputs(inputs)
            .map_err(|e| PipelineError::Sink(format!("{}: {}", self.inputs_path().display(), e)))?;
        self.write_targets(targets)
            .map_err(|e| PipelineError::Sink(format!("{}: {}", self.targets_path().display(), e)))?;
        log::info!(
            "wrote {:?} inputs and {} targets to {}",
            inputs.shape(),
            targets.len(),
            self.dir.display()
        );
        Ok(())
    }
}

/// NPY format 1.0 header, padded so the data starts on a 64-byte boundary
fn write_npy_header<W: Write>(out: &mut W, descr: &str, shape: &[usize]) -> std::io::Result<()> {
    let dims = match shape {
        [single] => format!("({},)", single),
        _ => format!(
            "({})",
            shape.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
        ),
    };
    let mut header = format!(
        "{{'descr': '{}', 'fortran_order': False, 'shape': {}, }}",
        descr, dims
    );

    // magic (6) + version (2) + length (2) + header + newline
    let unpadded = 10 + header.len() + 1;
    header.push_str(&" ".repeat((64 - unpadded % 64) % 64));
    header.push('\n');

    let length = u16::try_from(header.len())
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidInput, "npy header too long"))?;

    out.write_all(b"\x93NUMPY")?;
    out.write_all(&[1, 0])?;
    out.write_all(&length.to_le_bytes())?;
    out.write_all(header.as_bytes())
}
