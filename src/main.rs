use std::{env, fs::File, io::BufReader};

use anyhow::{bail, Context};
use log::info;
use serde::Deserialize;

use factor_graph_model::{
    dataset::{FactorGraphFeatures, FactorGraphLabels},
    factor::TableFactorType,
    FactorGraphModel, InitConfig, ModelConfig,
};

/// A full oracle run read from disk.
#[derive(Deserialize)]
struct Problem {
    #[serde(default)]
    config: ModelConfig,
    factor_types: Vec<TableFactorType>,
    graphs: FactorGraphFeatures,
    labels: FactorGraphLabels,
    weights: Option<Vec<f64>>,
    init: Option<InitConfig>,
    #[serde(default)]
    training: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let Some(path) = env::args().nth(1) else {
        bail!("usage: fgm <problem.json>");
    };

    let file = File::open(&path).with_context(|| format!("opening {path}"))?;
    let mut problem: Problem = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {path}"))?;

    if let Ok(verbose) = env::var("FGM_VERBOSE") {
        problem.config.verbose = matches!(verbose.as_str(), "1" | "true");
    }

    let mut model = FactorGraphModel::new(problem.graphs, problem.labels, problem.config)?;
    for ftype in problem.factor_types {
        model.add_factor_type(Box::new(ftype))?;
    }
    info!(
        "registered {} factor types, dimension {}",
        model.factor_types().count(),
        model.total_dimension()
    );

    if let Some(init) = problem.init {
        let mut weight_gen = init.build()?;
        model.init_weights(weight_gen.as_mut())?;
    }

    let w = match problem.weights {
        Some(w) => w,
        None => model.w_cache().to_vec(),
    };

    model.init_training();
    for i in 0..model.features().len() {
        let ret = model
            .argmax(&w, i, problem.training)
            .with_context(|| format!("max oracle on sample {i}"))?;

        info!(sample = i, score = ret.score, delta = ret.delta; "max oracle done");
        println!("{}", serde_json::to_string(&ret)?);
    }

    Ok(())
}
