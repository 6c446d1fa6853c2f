use anyhow::{bail, Context};
use clap::{Args as ClapArgs, Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::time::Instant;

use mushroom_classifier::{
    global_store, shared_store, ArtifactConfig, ArtifactStore, Classifier, ClassifierError, Feature,
    Selection,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding decision_tree.json and encoders.json
    #[arg(short, long, global = true)]
    artifacts: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the selectable values of each feature
    Options {
        /// Only show this feature (e.g. "gill-color")
        #[arg(short, long)]
        feature: Option<String>,
    },
    /// Predict whether a mushroom is edible
    Predict(PredictArgs),
    /// Load the artifacts and print their digests and model summary
    Verify,
}

#[derive(ClapArgs)]
struct PredictArgs {
    #[arg(long)]
    odor: String,
    #[arg(long)]
    gill_size: String,
    #[arg(long)]
    gill_color: String,
    #[arg(long)]
    spore_print_color: String,
    #[arg(long)]
    population: String,
    #[arg(long)]
    stalk_surface_above_ring: String,
    /// Also print the encoded feature vector
    #[arg(long)]
    show_encoding: bool,
}

impl PredictArgs {
    fn selection(&self) -> Result<Selection, ClassifierError> {
        Selection::builder()
            .odor(&self.odor)
            .gill_size(&self.gill_size)
            .gill_color(&self.gill_color)
            .spore_print_color(&self.spore_print_color)
            .population(&self.population)
            .stalk_surface_above_ring(&self.stalk_surface_above_ring)
            .build()
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let store = match &args.artifacts {
        Some(dir) => shared_store(ArtifactConfig::new(dir)),
        None => global_store(),
    };

    match args.command {
        Command::Options { feature } => print_options(feature.as_deref()),
        Command::Predict(predict) => run_predict(&store, &predict),
        Command::Verify => run_verify(&store),
    }
}

fn print_options(only: Option<&str>) -> anyhow::Result<()> {
    let features = match only {
        Some(name) => match Feature::from_name(name) {
            Some(feature) => vec![feature],
            None => bail!(
                "unknown feature '{}'; expected one of: {}",
                name,
                Feature::ALL.map(|f| f.name()).join(", ")
            ),
        },
        None => Feature::ALL.to_vec(),
    };

    for feature in features {
        println!("{}:", feature);
        for option in feature.option_table() {
            println!("  {} ({})", option.value, option.code);
        }
    }
    Ok(())
}

fn run_predict(store: &ArtifactStore, args: &PredictArgs) -> anyhow::Result<()> {
    let start_time = Instant::now();
    let classifier = Classifier::builder()
        .with_store(store)
        .and_then(|builder| builder.build())
        .with_context(|| format!("failed to load artifacts from {:?}", store.config().dir))?;
    info!("Classifier ready (took {:.2?})", start_time.elapsed());

    let result = args.selection().and_then(|selection| {
        let vector = classifier.encode(&selection)?;
        if args.show_encoding {
            println!("Encoded features:");
            for (feature, value) in vector.iter() {
                println!("  {}: {}", feature, value);
            }
        }
        classifier.predict_encoded(&vector)
    });

    match result {
        Ok(verdict) => {
            println!("This mushroom is predicted to be {}!", verdict);
            Ok(())
        }
        Err(e) if e.is_user_error() => {
            eprintln!("\nInvalid selection: {}", e);
            if let ClassifierError::UnknownValue { feature, .. } = &e {
                let options: Vec<&str> = feature.options().collect();
                eprintln!("Valid values for {}: {}", feature, options.join(", "));
            }
            Err(e.into())
        }
        Err(e) => Err(anyhow::Error::new(e).context("prediction failed; the artifacts may not match this build")),
    }
}

fn run_verify(store: &ArtifactStore) -> anyhow::Result<()> {
    let digests = store
        .file_digests()
        .with_context(|| format!("failed to read artifacts in {:?}", store.config().dir))?;
    println!("{}: {}", store.model_path().display(), digests.model);
    println!("{}: {}", store.encoders_path().display(), digests.encoders);

    let classifier = Classifier::builder().with_store(store)?.build()?;
    let info = classifier.info();
    println!("{}", info.model_description);
    println!(
        "Feature order: {}",
        info.feature_order.iter().map(|f| f.name()).collect::<Vec<_>>().join(", ")
    );
    for (feature, size) in info.encoder_sizes {
        println!("  {} encoder: {} codes", feature, size);
    }
    Ok(())
}
