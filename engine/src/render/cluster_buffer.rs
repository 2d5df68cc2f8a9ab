//! Cluster Light Buffer (fixed-record encoding)
//!
//! One fixed-size row per cluster, stored as a flat array of `u32` scalars that
//! are grouped into four-channel elements (the layout of an RGBA texel or a
//! WGSL `vec4<u32>`). This buffer is the transport format between the CPU
//! culling stage and the shading stage.
//!
//! ## Row Layout
//!
//! ```text
//! element:   0                  1                  2
//! channel:   0   1   2   3      0   1   2   3      0 ...
//! scalar:  count id1 id2 id3   id4 id5 id6 id7   id8 ...
//! ```
//!
//! - `row_stride = ceil((max_lights_per_cluster + 1) / 4) * 4` scalars
//! - `element_offset(cluster, element) = cluster * row_stride + element * 4`
//! - `count` lives in channel 0 of element 0
//! - light identifier `k` (1-based) lives in channel `k % 4` of element `k / 4`
//!
//! Only the first `count` identifiers of a row are meaningful; stale values
//! past `count` are left in place and never read.
//!
//! ## Memory
//!
//! Default grid 15×15×15 with 500 lights per cluster:
//! 3,375 rows × 504 scalars × 4 bytes = 6,804,000 bytes (~6.5 MB)

use super::cluster_config::{CHANNELS_PER_ELEMENT, ClusterGridConfig};

/// Decoded contents of one cluster row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClusterRecord {
    /// Number of valid light identifiers
    pub count: u32,
    /// Light identifiers in insertion order (`count` entries)
    pub indices: Vec<u32>,
}

/// Packed per-cluster light lists for the whole grid.
#[derive(Clone)]
pub struct ClusterBuffer {
    cluster_count: usize,
    max_lights_per_cluster: u32,
    elements_per_row: usize,
    data: Vec<u32>,
}

impl std::fmt::Debug for ClusterBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterBuffer")
            .field("cluster_count", &self.cluster_count)
            .field("max_lights_per_cluster", &self.max_lights_per_cluster)
            .field("row_stride", &self.row_stride())
            .field("data", &format_args!("[u32; {}]", self.data.len()))
            .finish()
    }
}

impl ClusterBuffer {
    /// Allocate a zeroed buffer sized for the given grid configuration.
    pub fn new(config: &ClusterGridConfig) -> Self {
        Self::with_capacity(config.total_clusters(), config.max_lights_per_cluster)
    }

    /// Allocate a zeroed buffer for `cluster_count` rows of `max_lights_per_cluster` lights.
    pub fn with_capacity(cluster_count: usize, max_lights_per_cluster: u32) -> Self {
        let elements_per_row = (max_lights_per_cluster as usize + 1).div_ceil(CHANNELS_PER_ELEMENT);
        Self {
            cluster_count,
            max_lights_per_cluster,
            elements_per_row,
            data: vec![0; cluster_count * elements_per_row * CHANNELS_PER_ELEMENT],
        }
    }

    /// Number of cluster rows.
    #[inline]
    pub fn cluster_count(&self) -> usize {
        self.cluster_count
    }

    /// Maximum light identifiers per row.
    #[inline]
    pub fn max_lights_per_cluster(&self) -> u32 {
        self.max_lights_per_cluster
    }

    /// Four-channel elements per row.
    #[inline]
    pub fn elements_per_row(&self) -> usize {
        self.elements_per_row
    }

    /// Scalars per row.
    #[inline]
    pub fn row_stride(&self) -> usize {
        self.elements_per_row * CHANNELS_PER_ELEMENT
    }

    /// Texture-shaped extent `(width, height)`: one column per cluster and one
    /// texel row per element.
    #[inline]
    pub fn texture_extent(&self) -> (u32, u32) {
        (self.cluster_count as u32, self.elements_per_row as u32)
    }

    /// Scalar offset of the first channel of `element` in `cluster`'s row.
    #[inline]
    pub fn element_offset(&self, cluster: usize, element: usize) -> usize {
        cluster * self.row_stride() + element * CHANNELS_PER_ELEMENT
    }

    /// Scalar offset of slot `k` in `cluster`'s row (slot 0 is the count).
    #[inline]
    fn slot_offset(&self, cluster: usize, k: usize) -> usize {
        self.element_offset(cluster, k / CHANNELS_PER_ELEMENT) + k % CHANNELS_PER_ELEMENT
    }

    /// Number of lights recorded for `cluster`.
    #[inline]
    pub fn count(&self, cluster: usize) -> u32 {
        self.data[self.element_offset(cluster, 0)]
    }

    /// Whether `cluster` has reached its capacity.
    #[inline]
    pub fn is_full(&self, cluster: usize) -> bool {
        self.count(cluster) >= self.max_lights_per_cluster
    }

    /// The `k`-th (0-based) light identifier of `cluster`, if `k < count`.
    #[inline]
    pub fn light(&self, cluster: usize, k: u32) -> Option<u32> {
        if k < self.count(cluster) {
            Some(self.data[self.slot_offset(cluster, k as usize + 1)])
        } else {
            None
        }
    }

    /// Iterate the valid light identifiers of `cluster` in insertion order.
    pub fn lights(&self, cluster: usize) -> impl Iterator<Item = u32> + '_ {
        (0..self.count(cluster)).map(move |k| self.data[self.slot_offset(cluster, k as usize + 1)])
    }

    /// Decode `cluster`'s row.
    pub fn record(&self, cluster: usize) -> ClusterRecord {
        ClusterRecord {
            count: self.count(cluster),
            indices: self.lights(cluster).collect(),
        }
    }

    /// Append a light identifier to `cluster`.
    ///
    /// Returns `false` (and writes nothing) if the row is already full.
    #[inline]
    pub fn push_light(&mut self, cluster: usize, light_id: u32) -> bool {
        let count_offset = self.element_offset(cluster, 0);
        let count = self.data[count_offset];
        if count >= self.max_lights_per_cluster {
            return false;
        }
        let slot = self.slot_offset(cluster, count as usize + 1);
        self.data[slot] = light_id;
        self.data[count_offset] = count + 1;
        true
    }

    /// Reset every row's count to zero. Identifier slots are not cleared.
    pub fn reset_counts(&mut self) {
        let stride = self.row_stride();
        for row in self.data.chunks_exact_mut(stride) {
            row[0] = 0;
        }
    }

    /// Raw scalars, row after row.
    #[inline]
    pub fn as_slice(&self) -> &[u32] {
        &self.data
    }

    /// Raw bytes for upload.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Size of the packed buffer in bytes.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.data.len() * std::mem::size_of::<u32>()
    }

    /// Borrow the packed scalars through the decoder view.
    #[inline]
    pub fn view(&self) -> PackedClusterView<'_> {
        PackedClusterView::new(&self.data, self.row_stride())
    }
}

/// Read-only decoder over packed cluster scalars.
///
/// Works on any `&[u32]` following the row layout, e.g. bytes read back
/// from the GPU, independently of the [`ClusterBuffer`] that produced them.
#[derive(Clone, Copy, Debug)]
pub struct PackedClusterView<'a> {
    data: &'a [u32],
    row_stride: usize,
}

impl<'a> PackedClusterView<'a> {
    /// Wrap raw scalars with the given row stride (a multiple of 4).
    pub fn new(data: &'a [u32], row_stride: usize) -> Self {
        debug_assert!(row_stride > 0 && row_stride % CHANNELS_PER_ELEMENT == 0);
        Self { data, row_stride }
    }

    /// Wrap raw bytes; returns `None` if the bytes are not `u32`-aligned.
    pub fn from_bytes(bytes: &'a [u8], row_stride: usize) -> Option<Self> {
        bytemuck::try_cast_slice(bytes)
            .ok()
            .map(|data| Self::new(data, row_stride))
    }

    /// Number of whole rows in the view.
    #[inline]
    pub fn cluster_count(&self) -> usize {
        self.data.len() / self.row_stride
    }

    /// Fetch one four-channel element of a row.
    #[inline]
    pub fn element(&self, cluster: usize, element: usize) -> [u32; 4] {
        let base = cluster * self.row_stride + element * CHANNELS_PER_ELEMENT;
        [
            self.data[base],
            self.data[base + 1],
            self.data[base + 2],
            self.data[base + 3],
        ]
    }

    /// Channel 0 of element 0.
    #[inline]
    pub fn count(&self, cluster: usize) -> u32 {
        self.element(cluster, 0)[0]
    }

    /// Light identifier `k` (1-based): channel `k % 4` of element `k / 4`.
    #[inline]
    pub fn light_id(&self, cluster: usize, k: u32) -> u32 {
        let k = k as usize;
        self.element(cluster, k / CHANNELS_PER_ELEMENT)[k % CHANNELS_PER_ELEMENT]
    }

    /// Decode a full row, reading identifiers `1..=count`.
    pub fn decode(&self, cluster: usize) -> ClusterRecord {
        let count = self.count(cluster);
        ClusterRecord {
            count,
            indices: (1..=count).map(|k| self.light_id(cluster, k)).collect(),
        }
    }
}
