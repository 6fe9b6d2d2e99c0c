use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const OUTPUT_DIR: &str = "sample";

const REGIONS: [&str; 3] = ["Metropolitana", "Valparaíso", "Biobío"];
const YEARS: [i64; 3] = [2021, 2022, 2023];

/// (institute, financing, regions where it has a campus)
const INSTITUTES: [(&str, &str, &[usize]); 5] = [
    ("UNIVERSIDAD DE LAS AMERICAS", "PRIVADA", &[0, 1, 2]),
    ("UNIVERSIDAD DE CHILE", "PÚBLICA", &[0]),
    ("UNIVERSIDAD ANDRES BELLO", "PRIVADA", &[0, 1, 2]),
    ("UNIVERSIDAD DE VALPARAISO", "PÚBLICA", &[1]),
    ("UNIVERSIDAD DE CONCEPCION", "PRIVADA", &[2]),
];

/// (faculty, programs)
const FACULTIES: [(&str, &[&str]); 3] = [
    ("Ingeniería y Negocios", &["Ingeniería en Software", "Ingeniería Civil Industrial"]),
    ("Salud", &["Enfermería", "Kinesiología", "Nutrición y Dietética"]),
    ("Educación", &["Pedagogía en Inglés", "Educación Parvularia"]),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Column-oriented rows of one output table.
#[derive(Default)]
struct Columns {
    region: Vec<String>,
    financing: Vec<String>,
    faculty: Vec<String>,
    program: Vec<String>,
    institute: Vec<String>,
    year: Vec<i64>,
    share: Vec<f64>,
}

impl Columns {
    fn len(&self) -> usize {
        self.year.len()
    }

    fn push(&mut self, region: &str, financing: &str, faculty: &str, program: Option<&str>, institute: &str, year: i64, share: f64) {
        self.region.push(region.to_string());
        self.financing.push(financing.to_string());
        self.faculty.push(faculty.to_string());
        if let Some(p) = program {
            self.program.push(p.to_string());
        }
        self.institute.push(institute.to_string());
        self.year.push(year);
        self.share.push(share);
    }

    fn with_program(&self) -> bool {
        !self.program.is_empty()
    }

    fn batch(&self, share_header: &str) -> Result<(Arc<Schema>, RecordBatch)> {
        let strings = |v: &Vec<String>| -> ArrayRef {
            Arc::new(StringArray::from(v.iter().map(String::as_str).collect::<Vec<_>>()))
        };

        let mut fields = vec![
            Field::new("REGION", DataType::Utf8, false),
            Field::new("FINANCIAMIENTO", DataType::Utf8, false),
            Field::new("FACULTAD UDLA", DataType::Utf8, false),
        ];
        let mut arrays = vec![strings(&self.region), strings(&self.financing), strings(&self.faculty)];
        if self.with_program() {
            fields.push(Field::new("CARRERA UDLA", DataType::Utf8, false));
            arrays.push(strings(&self.program));
        }
        fields.extend([
            Field::new("Instituto", DataType::Utf8, false),
            Field::new("AÑO", DataType::Int64, false),
            Field::new(share_header, DataType::Float64, false),
        ]);
        arrays.extend([
            strings(&self.institute),
            Arc::new(Int64Array::from(self.year.clone())) as ArrayRef,
            Arc::new(Float64Array::from(self.share.clone())) as ArrayRef,
        ]);

        let schema = Arc::new(Schema::new(fields));
        let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;
        Ok((schema, batch))
    }

    fn write_parquet(&self, path: &Path, share_header: &str) -> Result<()> {
        let (schema, batch) = self.batch(share_header)?;
        let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
        writer.write(&batch).context("writing batch")?;
        writer.close().context("closing parquet writer")?;
        Ok(())
    }

    fn write_csv(&self, path: &Path, share_header: &str) -> Result<()> {
        let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;

        let mut header = vec!["REGION", "FINANCIAMIENTO", "FACULTAD UDLA"];
        if self.with_program() {
            header.push("CARRERA UDLA");
        }
        header.extend(["Instituto", "AÑO", share_header]);
        writer.write_record(&header)?;

        for i in 0..self.len() {
            let year = self.year[i].to_string();
            let share = format!("{:.6}", self.share[i]);
            let mut row = vec![self.region[i].as_str(), self.financing[i].as_str(), self.faculty[i].as_str()];
            if self.with_program() {
                row.push(self.program[i].as_str());
            }
            row.extend([self.institute[i].as_str(), year.as_str(), share.as_str()]);
            writer.write_record(&row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let mut faculties = Columns::default();
    let mut programs = Columns::default();

    // The faculty row is the mean of its program rows.
    for (region_idx, region) in REGIONS.iter().enumerate() {
        for (faculty, faculty_programs) in FACULTIES {
            for year in YEARS {
                for (institute, financing, campuses) in INSTITUTES {
                    if !campuses.contains(&region_idx) {
                        continue;
                    }
                    let mut faculty_share = 0.0;
                    for &program in faculty_programs {
                        let share = 0.02 + rng.next_f64() * 0.18;
                        faculty_share += share / faculty_programs.len() as f64;
                        programs.push(region, financing, faculty, Some(program), institute, year, share);
                    }
                    faculties.push(region, financing, faculty, None, institute, year, faculty_share);
                }
            }
        }
    }

    std::fs::create_dir_all(OUTPUT_DIR).context("creating output directory")?;
    let out = Path::new(OUTPUT_DIR);
    faculties.write_csv(&out.join("facultades.csv"), "Participación")?;
    faculties.write_parquet(&out.join("facultades.parquet"), "Participación")?;
    programs.write_csv(&out.join("carreras.csv"), "Participación")?;
    programs.write_parquet(&out.join("carreras.parquet"), "Participación")?;

    println!(
        "Wrote {} faculty rows and {} program rows to {OUTPUT_DIR}/",
        faculties.len(),
        programs.len()
    );
    Ok(())
}
