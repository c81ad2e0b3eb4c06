use std::env;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() != 4 {
        eprintln!("Usage: {} <input.txt> <output.txt> <sample_percentage>", args[0]);
        eprintln!("Example: sample_corpus corpus.txt sample.txt 10");
        std::process::exit(1);
    }

    let input_path = PathBuf::from(&args[1]);
    let output_path = PathBuf::from(&args[2]);
    let sample_percentage: f32 = args[3].parse()
        .map_err(|_| "Sample percentage must be a number")?;

    if sample_percentage <= 0.0 || sample_percentage > 100.0 {
        eprintln!("Sample percentage must be between 0 and 100");
        std::process::exit(1);
    }

    println!("Sampling {}% of documents from {} to {}",
             sample_percentage, input_path.display(), output_path.display());

    let documents: Vec<String> = BufReader::new(File::open(&input_path)?)
        .lines()
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .collect();
    let total_documents = documents.len();
    println!("Total documents in source: {}", total_documents);

    let sample_size = ((total_documents as f32) * (sample_percentage / 100.0)) as usize;
    let step = if sample_size > 0 { total_documents / sample_size } else { 1 };
    let step = step.max(1);
    println!("Taking every {}th document", step);

    let mut writer = BufWriter::new(File::create(&output_path)?);
    let mut sampled_count = 0;
    for document in documents.iter().step_by(step) {
        writeln!(writer, "{}", document)?;
        sampled_count += 1;
    }
    writer.flush()?;

    println!("✅ Wrote {} documents to {}", sampled_count, output_path.display());
    Ok(())
}
