mod geometry;
mod report;

pub use geometry::{read_geo, read_geometry, read_poscar, read_xyz};
pub use report::{
    write_cna_report, write_cna_report_file, write_similarity_report, write_similarity_report_file,
};
