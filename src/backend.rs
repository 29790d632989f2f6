//! Backend selection for suppression calls.
//!
//! Callers holding buffers on some device ask the [`Dispatcher`] for a backend
//! able to service that device. The crate ships the CPU backend; accelerator
//! implementations plug in through [`SuppressionBackend`] and must honor the
//! same contracts as [`greedy_nms`] and [`hashed_nms`].

use crate::geometry::BoxesView;
use crate::greedy::greedy_nms;
use crate::hashed::{hashed_nms, HashParams};
use crate::util::{NmsError, NmsResult};

/// Where a caller's box and score buffers live.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Device {
    /// Host memory.
    Cpu,
    /// Accelerator-resident memory.
    Accelerator,
}

/// An implementation of both suppression algorithms for some set of devices.
pub trait SuppressionBackend: Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Returns true if this backend can read buffers on `device`.
    fn supports(&self, device: Device) -> bool;

    /// Greedy NMS over corner-form boxes; see [`greedy_nms`].
    fn nms(
        &self,
        boxes: BoxesView<'_>,
        scores: &[f32],
        iou_threshold: f32,
    ) -> NmsResult<Vec<usize>>;

    /// Hashed NMS over `(x, y, w, h)` boxes; see [`hashed_nms`].
    fn hnms(
        &self,
        boxes: BoxesView<'_>,
        scores: &[f32],
        params: &HashParams,
    ) -> NmsResult<Vec<usize>>;
}

/// Backend running the algorithms of this crate on host memory.
#[derive(Clone, Copy, Debug, Default)]
pub struct CpuBackend;

impl SuppressionBackend for CpuBackend {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn supports(&self, device: Device) -> bool {
        device == Device::Cpu
    }

    fn nms(
        &self,
        boxes: BoxesView<'_>,
        scores: &[f32],
        iou_threshold: f32,
    ) -> NmsResult<Vec<usize>> {
        greedy_nms(boxes, scores, iou_threshold)
    }

    fn hnms(
        &self,
        boxes: BoxesView<'_>,
        scores: &[f32],
        params: &HashParams,
    ) -> NmsResult<Vec<usize>> {
        hashed_nms(boxes, scores, params)
    }
}

/// Routes calls to the first registered backend supporting the device.
pub struct Dispatcher {
    backends: Vec<Box<dyn SuppressionBackend>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::cpu_only()
    }
}

impl Dispatcher {
    /// Creates a dispatcher with only the CPU backend.
    pub fn cpu_only() -> Self {
        Self {
            backends: vec![Box::new(CpuBackend)],
        }
    }

    /// Adds a backend. Earlier registrations take precedence.
    pub fn register(&mut self, backend: Box<dyn SuppressionBackend>) -> &mut Self {
        self.backends.push(backend);
        self
    }

    /// Returns the names of registered backends in priority order.
    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Picks the backend for `device`.
    pub fn select(&self, device: Device) -> NmsResult<&dyn SuppressionBackend> {
        self.backends
            .iter()
            .find(|b| b.supports(device))
            .map(|b| b.as_ref())
            .ok_or(NmsError::BackendUnavailable { device })
    }

    /// Greedy NMS on the backend serving `device`.
    ///
    /// Empty input returns an empty result even if no backend serves the
    /// device.
    pub fn nms(
        &self,
        device: Device,
        boxes: BoxesView<'_>,
        scores: &[f32],
        iou_threshold: f32,
    ) -> NmsResult<Vec<usize>> {
        if boxes.is_empty() && scores.is_empty() {
            return Ok(Vec::new());
        }
        self.select(device)?.nms(boxes, scores, iou_threshold)
    }

    /// Hashed NMS on the backend serving `device`.
    pub fn hnms(
        &self,
        device: Device,
        boxes: BoxesView<'_>,
        scores: &[f32],
        params: &HashParams,
    ) -> NmsResult<Vec<usize>> {
        if boxes.is_empty() && scores.is_empty() {
            return Ok(Vec::new());
        }
        self.select(device)?.hnms(boxes, scores, params)
    }
}

#[cfg(test)]
mod tests {
    use super::{Device, Dispatcher};
    use crate::util::NmsError;

    #[test]
    fn cpu_only_rejects_accelerator() {
        let dispatcher = Dispatcher::cpu_only();
        assert!(dispatcher.select(Device::Cpu).is_ok());
        assert_eq!(
            dispatcher.select(Device::Accelerator).err(),
            Some(NmsError::BackendUnavailable {
                device: Device::Accelerator
            })
        );
    }

    #[test]
    fn default_registers_cpu() {
        assert_eq!(Dispatcher::default().backend_names(), vec!["cpu"]);
    }
}
