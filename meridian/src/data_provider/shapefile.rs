use crate::error::WorkbenchError;
use geojson::FeatureCollection;

/// Decoder of zipped shapefile archives.
///
/// Decoding shapefiles is left to the application; the workbench only needs the decoded feature collection.
/// Decoders should report malformed or unsupported archives as [`WorkbenchError::Input`].
pub trait ShapefileDecoder {
    /// Decodes the archive into a single feature collection.
    fn decode(&self, archive: &[u8]) -> Result<FeatureCollection, WorkbenchError>;
}

impl<F> ShapefileDecoder for F
where
    F: Fn(&[u8]) -> Result<FeatureCollection, WorkbenchError>,
{
    fn decode(&self, archive: &[u8]) -> Result<FeatureCollection, WorkbenchError> {
        self(archive)
    }
}
