//! Export helpers for CSV and JSON artifacts.

pub mod points {
    use std::fs::{self, File};
    use std::io::{self, BufWriter, Write};
    use std::path::Path;

    use terminus_core::time::format_epoch;
    use terminus_core::units::rad_to_deg;
    use terminus_core::vector;
    use terminus_terminator::{TerminatorPoint, TerminatorTable};

    pub const HEADER: &str = "cut,roll_deg,point,target_et,target_tdb,x_km,y_km,z_km,radius_km,obs_x_km,obs_y_km,obs_z_km,range_km";

    /// Create a writer for the target path, handling stdout (`-`) by convention.
    pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
        if path == Path::new("-") {
            return Ok(Box::new(BufWriter::new(io::stdout())));
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        Ok(Box::new(BufWriter::new(file)))
    }

    /// Write the terminator CSV header.
    pub fn write_header(writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "{}", HEADER)
    }

    /// One CSV row per terminator point.
    #[derive(Debug, Clone)]
    pub struct Record<'a> {
        pub cut: usize,
        pub roll_rad: f64,
        pub index: usize,
        pub point: &'a TerminatorPoint,
    }

    impl Record<'_> {
        /// Serialize the record to CSV, matching the header ordering.
        pub fn write_to(&self, writer: &mut dyn Write) -> io::Result<()> {
            let p = &self.point.position;
            let s = &self.point.surface_vector;
            writeln!(
                writer,
                "{},{:.9},{},{:.6},{},{:.9},{:.9},{:.9},{:.9},{:.9},{:.9},{:.9},{:.9}",
                self.cut,
                rad_to_deg(self.roll_rad),
                self.index,
                self.point.target_epoch,
                format_epoch(self.point.target_epoch),
                p[0],
                p[1],
                p[2],
                vector::norm(p),
                s[0],
                s[1],
                s[2],
                vector::norm(s),
            )
        }
    }

    /// Write the header and every point of `table`.
    pub fn write_table(writer: &mut dyn Write, table: &TerminatorTable) -> io::Result<()> {
        write_header(writer)?;
        for row in table.rows() {
            for (index, point) in row.points.iter().enumerate() {
                Record {
                    cut: row.cut,
                    roll_rad: row.roll(),
                    index,
                    point,
                }
                .write_to(writer)?;
            }
        }
        writer.flush()
    }
}

pub mod summary {
    use serde::Serialize;
    use serde_json::to_writer_pretty;
    use std::fs::{self, File};
    use std::io;
    use std::path::Path;

    use terminus_core::time::format_epoch;
    use terminus_core::units::rad_to_deg;
    use terminus_terminator::TerminatorTable;

    /// Request metadata echoed into the JSON summary.
    #[derive(Debug)]
    pub struct Metadata<'a> {
        pub scenario: Option<&'a str>,
        pub method: &'a str,
        pub illumination_source: &'a str,
        pub target: &'a str,
        pub observer: &'a str,
        pub frame: &'a str,
        pub epoch: f64,
        pub aberration_correction: &'a str,
        pub locus: &'a str,
    }

    #[derive(Serialize)]
    struct Summary<'a> {
        scenario: Option<&'a str>,
        method: &'a str,
        illumination_source: &'a str,
        target: &'a str,
        observer: &'a str,
        frame: &'a str,
        epoch_et: f64,
        epoch_tdb: String,
        aberration_correction: &'a str,
        locus: &'a str,
        point_count: usize,
        cuts: Vec<Cut>,
    }

    #[derive(Serialize)]
    struct Cut {
        cut: usize,
        roll_deg: f64,
        target_et: f64,
        points: Vec<Point>,
    }

    #[derive(Serialize)]
    struct Point {
        position_km: [f64; 3],
        target_et: f64,
        surface_vector_km: [f64; 3],
    }

    /// Write a pretty-printed JSON summary of `table`.
    pub fn write_summary(
        output: &Path,
        meta: &Metadata<'_>,
        table: &TerminatorTable,
    ) -> io::Result<()> {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let summary = Summary {
            scenario: meta.scenario,
            method: meta.method,
            illumination_source: meta.illumination_source,
            target: meta.target,
            observer: meta.observer,
            frame: meta.frame,
            epoch_et: meta.epoch,
            epoch_tdb: format_epoch(meta.epoch),
            aberration_correction: meta.aberration_correction,
            locus: meta.locus,
            point_count: table.point_count(),
            cuts: table
                .rows()
                .iter()
                .map(|row| Cut {
                    cut: row.cut,
                    roll_deg: rad_to_deg(row.roll()),
                    target_et: row.target_epoch,
                    points: row
                        .points
                        .iter()
                        .map(|point| Point {
                            position_km: point.position,
                            target_et: point.target_epoch,
                            surface_vector_km: point.surface_vector,
                        })
                        .collect(),
                })
                .collect(),
        };
        to_writer_pretty(File::create(output)?, &summary)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::points;
    use std::f64::consts::FRAC_PI_2;
    use terminus_core::vector;
    use terminus_terminator::{CuttingHalfPlane, TerminatorPoint, TerminatorRow, TerminatorTable};

    fn table() -> TerminatorTable {
        let point = TerminatorPoint {
            position: [0.0, 3.0, 4.0],
            target_epoch: -2.5,
            surface_vector: [10.0, 3.0, 4.0],
        };
        let rows = (0..2)
            .map(|cut| TerminatorRow {
                cut,
                half_plane: CuttingHalfPlane::new(
                    &[1.0, 0.0, 0.0],
                    &[0.0, 0.0, 1.0],
                    cut as f64 * FRAC_PI_2,
                )
                .unwrap(),
                target_epoch: -2.5,
                points: if cut == 0 { vec![point, point] } else { Vec::new() },
            })
            .collect();
        TerminatorTable::new(rows)
    }

    #[test]
    fn rows_without_points_write_no_records() {
        let mut buffer = Vec::new();
        points::write_table(&mut buffer, &table()).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], points::HEADER);
        assert!(lines[2].starts_with("0,0.000000000,1,-2.500000,"));
        let fields: Vec<&str> = lines[1].split(',').collect();
        assert_eq!(fields.len(), points::HEADER.split(',').count());
        assert_eq!(fields[8], "5.000000000");
        let range: f64 = fields[12].parse().unwrap();
        assert!((range - vector::norm(&[10.0, 3.0, 4.0])).abs() < 1e-9);
    }

    #[test]
    fn writer_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("points.csv");
        let mut writer = points::writer_for_path(&path).unwrap();
        points::write_table(writer.as_mut(), &table()).unwrap();
        drop(writer);
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("cut,"));
    }
}
