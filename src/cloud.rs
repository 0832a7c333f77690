//! A minimal point-cloud container: ordered 3D points plus named per-point
//! descriptor channels and per-point time vectors.
//!
//! Descriptor values are stored point-major in one flat buffer with a
//! channel table mapping names to (offset, width) spans, so a point's full
//! descriptor row is a contiguous slice.

use nalgebra::Vector3;

#[derive(Debug, Clone)]
struct Channel {
    name: String,
    width: usize,
    offset: usize,
}

/// An ordered collection of 3D points with named descriptor channels and
/// optional per-point time vectors.
#[derive(Debug, Clone)]
pub struct PointCloud {
    points: Vec<Vector3<f64>>,
    channels: Vec<Channel>,
    desc_width: usize,
    descriptors: Vec<f64>,
    time_width: usize,
    times: Vec<i64>,
}

impl PointCloud {
    /// Create a cloud holding `points`, with no descriptor channels and no
    /// time data.
    pub fn new(points: Vec<Vector3<f64>>) -> Self {
        Self::with_times(points, 0, Vec::new())
    }

    /// Create a cloud with `time_width` time values per point.
    ///
    /// `times` is point-major and must hold `time_width` values per point.
    pub fn with_times(points: Vec<Vector3<f64>>, time_width: usize, times: Vec<i64>) -> Self {
        assert_eq!(
            times.len(),
            time_width * points.len(),
            "time data must hold time_width values per point"
        );
        Self {
            points,
            channels: Vec::new(),
            desc_width: 0,
            descriptors: Vec::new(),
            time_width,
            times,
        }
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the cloud holds no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Position of point `index`.
    #[inline]
    pub fn point(&self, index: usize) -> Vector3<f64> {
        self.points[index]
    }

    /// Overwrite the position of point `index`.
    #[inline]
    pub fn set_point(&mut self, index: usize, point: Vector3<f64>) {
        self.points[index] = point;
    }

    fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.iter().find(|channel| channel.name == name)
    }

    /// Whether a descriptor channel named `name` exists.
    pub fn descriptor_exists(&self, name: &str) -> bool {
        self.channel(name).is_some()
    }

    /// Width of the channel named `name`, if present.
    pub fn descriptor_width(&self, name: &str) -> Option<usize> {
        self.channel(name).map(|channel| channel.width)
    }

    /// Total width of one point's descriptor row across all channels.
    pub fn descriptor_row_width(&self) -> usize {
        self.desc_width
    }

    /// Append a descriptor channel of `width` values per point.
    ///
    /// `values` is point-major (`width` values per point). The channel name
    /// must not already exist.
    pub fn add_descriptor(&mut self, name: &str, width: usize, values: &[f64]) {
        assert!(
            !self.descriptor_exists(name),
            "descriptor channel `{name}` already exists"
        );
        assert_eq!(
            values.len(),
            width * self.len(),
            "descriptor data must hold {width} values per point"
        );

        let old_width = self.desc_width;
        let new_width = old_width + width;
        let mut descriptors = Vec::with_capacity(new_width * self.len());
        for i in 0..self.len() {
            descriptors.extend_from_slice(&self.descriptors[i * old_width..(i + 1) * old_width]);
            descriptors.extend_from_slice(&values[i * width..(i + 1) * width]);
        }

        self.channels.push(Channel {
            name: name.to_string(),
            width,
            offset: old_width,
        });
        self.desc_width = new_width;
        self.descriptors = descriptors;
    }

    /// The values of channel `name` for point `index`.
    ///
    /// Panics if the channel does not exist; a missing channel at this
    /// stage is a malformed cloud, not a recoverable condition.
    pub fn descriptor(&self, name: &str, index: usize) -> &[f64] {
        let channel = self
            .channel(name)
            .unwrap_or_else(|| panic!("no descriptor channel named `{name}`"));
        let start = index * self.desc_width + channel.offset;
        &self.descriptors[start..start + channel.width]
    }

    /// Overwrite the values of channel `name` for point `index`.
    pub fn set_descriptor(&mut self, name: &str, index: usize, values: &[f64]) {
        let (offset, width) = {
            let channel = self
                .channel(name)
                .unwrap_or_else(|| panic!("no descriptor channel named `{name}`"));
            (channel.offset, channel.width)
        };
        assert_eq!(values.len(), width, "value count must match channel width");
        let start = index * self.desc_width + offset;
        self.descriptors[start..start + width].copy_from_slice(values);
    }

    /// The full descriptor row of point `index`, all channels concatenated.
    pub fn descriptor_row(&self, index: usize) -> &[f64] {
        &self.descriptors[index * self.desc_width..(index + 1) * self.desc_width]
    }

    /// Overwrite the full descriptor row of point `index`.
    pub fn set_descriptor_row(&mut self, index: usize, values: &[f64]) {
        assert_eq!(
            values.len(),
            self.desc_width,
            "row must span all descriptor channels"
        );
        self.descriptors[index * self.desc_width..(index + 1) * self.desc_width]
            .copy_from_slice(values);
    }

    /// Number of time values per point.
    pub fn time_width(&self) -> usize {
        self.time_width
    }

    /// The time vector of point `index`.
    pub fn time(&self, index: usize) -> &[i64] {
        &self.times[index * self.time_width..(index + 1) * self.time_width]
    }

    /// Overwrite the time vector of point `index`.
    pub fn set_time(&mut self, index: usize, values: &[i64]) {
        assert_eq!(values.len(), self.time_width, "value count must match time width");
        self.times[index * self.time_width..(index + 1) * self.time_width]
            .copy_from_slice(values);
    }

    /// Resize to `count` points, zero-filling any new rows.
    pub fn resize(&mut self, count: usize) {
        self.points.resize(count, Vector3::zeros());
        self.descriptors.resize(count * self.desc_width, 0.0);
        self.times.resize(count * self.time_width, 0);
    }

    /// A zeroed cloud of `count` points with this cloud's channel layout
    /// and time width.
    pub fn similar_empty(&self, count: usize) -> PointCloud {
        PointCloud {
            points: vec![Vector3::zeros(); count],
            channels: self.channels.clone(),
            desc_width: self.desc_width,
            descriptors: vec![0.0; count * self.desc_width],
            time_width: self.time_width,
            times: vec![0; count * self.time_width],
        }
    }
}
