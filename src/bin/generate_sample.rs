//! Writes a small sample results tree to `sample_data/`:
//!
//! ```text
//! sample_data/
//!   benchmarks.json          template catalogue
//!   data/hpl.json            job records for the `hpl` template
//!   data/stream.json         job records for the `stream` template
//!   data/vtune.json          hotspot runs
//!   records.parquet          the hpl records again, as a parquet table
//! ```

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde_json::json;

use benchscope::data::model::{BenchmarkTemplate, HotspotEntry, Run, TemplateVariable};

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
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

// ---------------------------------------------------------------------------
// Job records
// ---------------------------------------------------------------------------

/// One finished job of a scaling study.
struct Job {
    jobid: i64,
    num_nodes: i64,
    num_procs: i64,
    problem_size: i64,
    duration: f64,
    status: &'static str,
}

/// Strong-scaling style jobs: duration shrinks with process count, with
/// noise and the occasional failed job.
fn scaling_jobs(rng: &mut SimpleRng, first_id: i64, base_seconds: f64) -> Vec<Job> {
    let mut jobs = Vec::new();
    let mut jobid = first_id;
    for &problem_size in &[10_000i64, 20_000, 40_000] {
        for &num_nodes in &[1i64, 2, 4, 8] {
            for _repeat in 0..2 {
                let num_procs = num_nodes * 16;
                let work = base_seconds * problem_size as f64 / 10_000.0;
                let duration = (work / num_procs as f64 * 16.0 + rng.gauss(0.0, 0.05 * work)).max(0.1);
                let status = if rng.next_f64() < 0.08 { "FAILED" } else { "COMPLETED" };
                jobs.push(Job {
                    jobid,
                    num_nodes,
                    num_procs,
                    problem_size,
                    duration: (duration * 100.0).round() / 100.0,
                    status,
                });
                jobid += 1;
            }
        }
    }
    jobs
}

fn jobs_to_json(jobs: &[Job]) -> serde_json::Value {
    jobs.iter()
        .map(|j| {
            json!({
                "jobid": j.jobid,
                "NUM_NODES": j.num_nodes,
                "NUM_PROCS": j.num_procs,
                "PROBLEM_SIZE": j.problem_size,
                // Durations come out of the scheduler with units attached.
                "DURATION": format!("{}s", j.duration),
                "status": j.status,
            })
        })
        .collect()
}

fn write_parquet(path: &Path, jobs: &[Job]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("jobid", DataType::Int64, false),
        Field::new("NUM_NODES", DataType::Int64, false),
        Field::new("NUM_PROCS", DataType::Int64, false),
        Field::new("PROBLEM_SIZE", DataType::Int64, false),
        Field::new("DURATION", DataType::Float64, false),
        Field::new("status", DataType::Utf8, false),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from_iter_values(jobs.iter().map(|j| j.jobid))),
        Arc::new(Int64Array::from_iter_values(jobs.iter().map(|j| j.num_nodes))),
        Arc::new(Int64Array::from_iter_values(jobs.iter().map(|j| j.num_procs))),
        Arc::new(Int64Array::from_iter_values(jobs.iter().map(|j| j.problem_size))),
        Arc::new(Float64Array::from_iter_values(jobs.iter().map(|j| j.duration))),
        Arc::new(StringArray::from_iter_values(jobs.iter().map(|j| j.status))),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).context("Failed to create RecordBatch")?;

    let file = fs::File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("Failed to create writer")?;
    writer.write(&batch).context("Failed to write batch")?;
    writer.close().context("Failed to close writer")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Hotspot runs
// ---------------------------------------------------------------------------

const FUNCTIONS: [&str; 8] = [
    "dgemm_kernel",
    "MPI_Allreduce",
    "dtrsm_kernel",
    "pdlaswp",
    "memcpy",
    "HPL_dlaswp00N",
    "MPI_Wait",
    "HPL_pdpanel_free",
];

/// Successive profiles of the same code: weights drift a little between
/// runs, so ranks and percentages shift.
fn hotspot_runs(rng: &mut SimpleRng, n_runs: usize) -> Vec<Run> {
    let mut weights: Vec<f64> = (0..FUNCTIONS.len()).map(|i| 40.0 / (i as f64 + 1.0)).collect();
    (0..n_runs)
        .map(|r| {
            for w in &mut weights {
                *w = (*w + rng.gauss(0.0, 2.5)).max(0.5);
            }
            let total: f64 = weights.iter().sum();
            let mut hotspots: Vec<HotspotEntry> = FUNCTIONS
                .iter()
                .zip(&weights)
                .map(|(name, w)| HotspotEntry::new(*name, (w / total * 1000.0).round() / 10.0))
                .collect();
            hotspots.sort_by(|a, b| b.percent.total_cmp(&a.percent));
            // Later runs report fewer functions.
            hotspots.truncate(FUNCTIONS.len() - r.min(3));
            Run::new(format!("run-{}", r + 1), hotspots)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

fn template(name: &str, vars: &[(&str, &str)]) -> BenchmarkTemplate {
    BenchmarkTemplate {
        name: name.to_string(),
        vars: vars
            .iter()
            .map(|(name, desc)| TemplateVariable {
                name: name.to_string(),
                desc: desc.to_string(),
            })
            .collect(),
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let root = Path::new("sample_data");
    let data = root.join("data");
    fs::create_dir_all(&data).with_context(|| format!("Failed to create {}", data.display()))?;

    let scaling_vars = [
        ("NUM_NODES", "Nodes allocated to the job"),
        ("NUM_PROCS", "MPI ranks"),
        ("PROBLEM_SIZE", "Matrix order / array length"),
    ];
    let catalogue = vec![
        template("hpl", &scaling_vars),
        template("stream", &scaling_vars),
        template("vtune", &[]),
    ];
    write_json(&root.join("benchmarks.json"), &catalogue)?;

    let hpl = scaling_jobs(&mut rng, 1000, 120.0);
    let stream = scaling_jobs(&mut rng, 2000, 30.0);
    let runs = hotspot_runs(&mut rng, 4);

    write_json(&data.join("hpl.json"), &jobs_to_json(&hpl))?;
    write_json(&data.join("stream.json"), &jobs_to_json(&stream))?;
    write_json(&data.join("vtune.json"), &runs)?;
    write_parquet(&root.join("records.parquet"), &hpl)?;

    println!(
        "Wrote {} hpl jobs, {} stream jobs and {} hotspot runs to {}",
        hpl.len(),
        stream.len(),
        runs.len(),
        root.display()
    );
    Ok(())
}
