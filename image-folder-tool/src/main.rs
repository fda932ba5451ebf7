mod classes;

use anyhow::{Context, Result};
use futures::TryStreamExt as _;
use image::{DynamicImage, ImageBuffer};
use image_folder::{
    ColorMode, DatasetOptions, FileDataset, ImageFolderInit, ImageLoader, InterpolationMethod,
    RandomSeed, Resizer, StreamingDataset, TargetSize,
};
use log::info;
use ndarray::Array3;
use prettytable::{cell, row, Table};
use std::{
    path::{Path, PathBuf},
    time::Instant,
};
use structopt::StructOpt;

#[derive(Debug, Clone, StructOpt)]
/// Index, inspect and resize image folder datasets.
enum Args {
    /// Index a directory and print its classes and partitions.
    Index {
        /// dataset directory
        dir: PathBuf,
        #[structopt(long)]
        /// json5 dataset options file
        config: Option<PathBuf>,
        #[structopt(long)]
        /// file with one class name per line
        classes_file: Option<PathBuf>,
    },
    /// Stream a dataset and report element shapes and throughput.
    Inspect {
        /// dataset directory
        dir: PathBuf,
        #[structopt(long)]
        /// json5 dataset options file
        config: Option<PathBuf>,
        #[structopt(long, default_value = "1")]
        /// number of passes over each dataset
        passes: usize,
    },
    /// Resize a single image file.
    Resize {
        /// input image file
        input: PathBuf,
        /// output image file
        output: PathBuf,
        #[structopt(long)]
        height: usize,
        #[structopt(long)]
        width: usize,
        #[structopt(long, default_value = "bilinear")]
        interpolation: InterpolationMethod,
        #[structopt(long, default_value = "rgb")]
        color_mode: ColorMode,
        #[structopt(long)]
        /// take the largest centered crop with the target aspect ratio first
        crop_to_aspect_ratio: bool,
        #[structopt(long)]
        antialias: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();

    match Args::from_args() {
        Args::Index {
            dir,
            config,
            classes_file,
        } => index(dir, config, classes_file).await?,
        Args::Inspect {
            dir,
            config,
            passes,
        } => inspect(dir, config, passes).await?,
        Args::Resize {
            input,
            output,
            height,
            width,
            interpolation,
            color_mode,
            crop_to_aspect_ratio,
            antialias,
        } => {
            let size = TargetSize::new(height, width)?;
            let loader = ImageLoader::new(
                size,
                color_mode,
                Resizer::new(interpolation).antialias(antialias),
            )
            .crop_to_aspect_ratio(crop_to_aspect_ratio);
            resize(&loader, input, output)?
        }
    }

    Ok(())
}

fn load_options(config: Option<&Path>) -> Result<DatasetOptions> {
    let options = match config {
        Some(path) => DatasetOptions::open(path)
            .with_context(|| format!("failed to load config file '{}'", path.display()))?,
        None => DatasetOptions::default(),
    };
    Ok(options)
}

async fn index(dir: PathBuf, config: Option<PathBuf>, classes_file: Option<PathBuf>) -> Result<()> {
    let mut options = load_options(config.as_deref())?;
    if let Some(classes_file) = classes_file {
        let classes = classes::load_classes_file(classes_file).await?;
        options.class_names = Some(classes.into_iter().collect());
    }

    let folder = ImageFolderInit {
        options,
        seed_source: RandomSeed,
    }
    .build()?;
    let dataset = folder
        .load(&dir)
        .await
        .with_context(|| format!("failed to index directory '{}'", dir.display()))?;
    let datasets = dataset.datasets();

    // print per-class record counts
    {
        let mut table = Table::new();
        let mut header = row!["index", "class"];
        datasets.iter().for_each(|(subset, _)| {
            let name = subset.map(|subset| subset.to_string());
            header.add_cell(cell!(name.unwrap_or_else(|| "files".into())));
        });
        table.add_row(header);

        for (class_index, class_name) in dataset.class_names().iter().enumerate() {
            let mut row = row![class_index, class_name];
            datasets.iter().for_each(|(_, dataset)| {
                let count = dataset
                    .records()
                    .iter()
                    .filter(|record| record.label == Some(class_index))
                    .count();
                row.add_cell(cell!(count));
            });
            table.add_row(row);
        }

        table.printstd();
    }

    println!("seed: {}", folder.seed());
    datasets.iter().for_each(|(subset, dataset)| {
        let name = subset
            .map(|subset| subset.to_string())
            .unwrap_or_else(|| "dataset".into());
        println!("{}: {} files", name, dataset.records().len());
    });

    Ok(())
}

async fn inspect(dir: PathBuf, config: Option<PathBuf>, passes: usize) -> Result<()> {
    let options = load_options(config.as_deref())?;
    let folder = ImageFolderInit {
        options,
        seed_source: RandomSeed,
    }
    .build()?;
    let directory = folder
        .load(&dir)
        .await
        .with_context(|| format!("failed to index directory '{}'", dir.display()))?;

    for (subset, dataset) in directory.datasets() {
        let name = subset
            .map(|subset| subset.to_string())
            .unwrap_or_else(|| "dataset".into());

        for pass in 0..passes {
            let instant = Instant::now();
            let mut stream = dataset.stream();
            let mut num_elements = 0;
            let mut num_images = 0;

            while let Some(element) = stream.try_next().await? {
                if num_elements == 0 {
                    info!(
                        "{} pass {}: image shape {:?}, label shape {:?}",
                        name,
                        pass,
                        element.image_shape(),
                        element.label_shape()
                    );
                }
                num_elements += 1;
                num_images += element.len();
            }

            let elapsed = instant.elapsed();
            info!(
                "{} pass {}: {} elements, {} images in {:?} ({:.2} images/s)",
                name,
                pass,
                num_elements,
                num_images,
                elapsed,
                num_images as f64 / elapsed.as_secs_f64()
            );
        }
    }

    Ok(())
}

fn resize(loader: &ImageLoader, input: PathBuf, output: PathBuf) -> Result<()> {
    let array = loader
        .load(&input)
        .with_context(|| format!("failed to load image '{}'", input.display()))?;
    let image = to_image(array, loader.color_mode)?;
    image
        .save(&output)
        .with_context(|| format!("failed to save image '{}'", output.display()))?;

    info!(
        "resized '{}' to {} with {}",
        input.display(),
        loader.image_size,
        loader.resizer.method
    );
    Ok(())
}

fn to_image(array: Array3<f32>, color_mode: ColorMode) -> Result<DynamicImage> {
    let (height, width, _) = array.dim();
    let (height, width) = (height as u32, width as u32);
    let raw: Vec<u8> = array
        .iter()
        .map(|&value| value.round().max(0.0).min(255.0) as u8)
        .collect();
    let error = || anyhow::anyhow!("pixel buffer does not match image size {}x{}", height, width);

    let image = match color_mode {
        ColorMode::Grayscale => {
            DynamicImage::ImageLuma8(ImageBuffer::from_raw(width, height, raw).ok_or_else(error)?)
        }
        ColorMode::Rgb => {
            DynamicImage::ImageRgb8(ImageBuffer::from_raw(width, height, raw).ok_or_else(error)?)
        }
        ColorMode::Rgba => {
            DynamicImage::ImageRgba8(ImageBuffer::from_raw(width, height, raw).ok_or_else(error)?)
        }
    };
    Ok(image)
}
