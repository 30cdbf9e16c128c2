//! `crutch guide`
//!
//! Renders the scaler constants, the model weights, and a complete
//! scale-then-predict forward pass for Kotlin (Android) and C (embedded)
//! runtimes from the saved artifacts.

use crate::config::AppConfig;
use anyhow::Context;
use clap::Args;
use feature_scaler::{ScalerArtifact, FEATURE_COUNT};
use inference_engine::{Activation, DenseNetwork, ModelArtifact};
use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use trainer::ArtifactPaths;

#[derive(Debug, Args)]
pub struct GuideArgs {
    /// Scaler artifact (defaults to <model_dir>/scaler.json)
    #[arg(long)]
    pub scaler: Option<PathBuf>,

    /// Model to describe (defaults to the optimized model, then the binary one)
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Also write the guide to this file
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub fn run(args: GuideArgs, config: &AppConfig) -> anyhow::Result<()> {
    let paths = ArtifactPaths::in_dir(&config.paths.model_dir);
    let scaler_path = args.scaler.unwrap_or(paths.scaler);
    let scaler = ScalerArtifact::load(&scaler_path)
        .with_context(|| format!("Cannot read scaler {}", scaler_path.display()))?;
    scaler.validate()?;

    let model_path = args.model.unwrap_or_else(|| {
        if paths.model_optimized.exists() {
            paths.model_optimized
        } else {
            paths.model_bin
        }
    });
    let model_size = std::fs::metadata(&model_path).ok().map(|m| m.len());
    let network = load_network(&model_path, &scaler)?;

    let guide = render_guide(&scaler, network.as_ref(), &model_path, model_size)?;
    print!("{guide}");

    if let Some(output) = &args.output {
        std::fs::write(output, &guide)
            .with_context(|| format!("Cannot write {}", output.display()))?;
        info!("Integration guide written to {}", output.display());
    }
    Ok(())
}

/// Decoded weights of the model artifact, or `None` when there is nothing to export
fn load_network(
    model_path: &Path,
    scaler: &ScalerArtifact,
) -> anyhow::Result<Option<DenseNetwork>> {
    if !model_path.exists() {
        warn!(
            "Model {} not found; the guide will only cover scaling",
            model_path.display()
        );
        return Ok(None);
    }
    if model_path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("onnx"))
    {
        warn!(
            "Weights of ONNX graph {} are not exported; the guide will only cover scaling",
            model_path.display()
        );
        return Ok(None);
    }

    let model = ModelArtifact::load(model_path)
        .with_context(|| format!("Cannot read model {}", model_path.display()))?;
    model.ensure_matches(scaler)?;
    Ok(Some(model.to_network()?))
}

/// Build the full guide text
pub fn render_guide(
    scaler: &ScalerArtifact,
    network: Option<&DenseNetwork>,
    model_path: &Path,
    model_size: Option<u64>,
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    let rule = "=".repeat(60);
    let range: Vec<f32> = (0..FEATURE_COUNT)
        .map(|i| scaler.data_max[i] - scaler.data_min[i])
        .collect();

    writeln!(out, "Model path: {}", model_path.display())?;
    match model_size {
        Some(bytes) => writeln!(out, "Model size: {:.2} KB", bytes as f64 / 1024.0)?,
        None => writeln!(out, "Model size: (not found)")?,
    }
    writeln!(out, "Training run: {}", scaler.run_id)?;
    writeln!(out, "Scaler fingerprint: {}\n", scaler.fingerprint)?;

    writeln!(out, "{rule}\nTENSOR CONTRACT\n{rule}")?;
    writeln!(
        out,
        "\nInput:  float32 tensor of shape (1, {FEATURE_COUNT}), scaled features in the order below"
    )?;
    writeln!(out, "Output: float32 tensor of shape (1, 1), crutch height in cm\n")?;

    writeln!(out, "{rule}\nSCALER VALUES\n{rule}")?;
    writeln!(out, "\nFeature order:")?;
    for (i, name) in scaler.feature_names.iter().enumerate() {
        writeln!(out, "  {i}: {name}")?;
    }
    writeln!(out, "\nMin values:\n  {:?}", scaler.data_min)?;
    writeln!(out, "\nMax values:\n  {:?}", scaler.data_max)?;
    writeln!(out, "\nRange (max - min):\n  {:?}\n", range)?;

    writeln!(out, "{rule}\nMODEL LAYERS\n{rule}\n")?;
    match network {
        Some(network) => {
            for (n, layer) in network.layers().iter().enumerate() {
                writeln!(
                    out,
                    "  {n}: {} -> {}, {}",
                    layer.inputs(),
                    layer.outputs(),
                    activation_name(layer.activation())
                )?;
            }
            writeln!(out, "\nWeights are row-major with shape (inputs, outputs).\n")?;
        }
        None => writeln!(out, "  (no model weights available)\n")?,
    }

    writeln!(out, "{rule}\nKOTLIN (ANDROID)\n{rule}")?;
    writeln!(
        out,
        "\nprivate val MIN_VALUES = floatArrayOf({})",
        float_list(&scaler.data_min)
    )?;
    writeln!(
        out,
        "private val MAX_VALUES = floatArrayOf({})",
        float_list(&scaler.data_max)
    )?;
    out.push_str(KOTLIN_SCALE_FN);
    if let Some(network) = network {
        write_kotlin_model(&mut out, network)?;
    }

    writeln!(out, "\n{rule}\nC (EMBEDDED)\n{rule}")?;
    writeln!(
        out,
        "\nstatic const float MIN_VALUES[{FEATURE_COUNT}] = {{{}}};",
        float_list(&scaler.data_min)
    )?;
    writeln!(
        out,
        "static const float MAX_VALUES[{FEATURE_COUNT}] = {{{}}};",
        float_list(&scaler.data_max)
    )?;
    out.push_str(C_SCALE_FN);
    if let Some(network) = network {
        write_c_model(&mut out, network)?;
    }
    Ok(out)
}

fn write_kotlin_model(out: &mut String, network: &DenseNetwork) -> fmt::Result {
    writeln!(out)?;
    for (n, layer) in network.layers().iter().enumerate() {
        writeln!(
            out,
            "// layer {n}: {} -> {}, {}",
            layer.inputs(),
            layer.outputs(),
            activation_name(layer.activation())
        )?;
        writeln!(out, "private val W{n} = floatArrayOf({})", float_list(layer.weights()))?;
        writeln!(out, "private val B{n} = floatArrayOf({})", float_list(layer.bias()))?;
    }
    out.push_str(KOTLIN_DENSE_FN);

    writeln!(out, "\nfun predictCrutchHeight(raw: FloatArray): Float {{")?;
    writeln!(out, "    var x = scaleFeatures(raw)")?;
    for (n, layer) in network.layers().iter().enumerate() {
        writeln!(
            out,
            "    x = dense(x, W{n}, B{n}, relu = {})",
            layer.activation() == Activation::Relu
        )?;
    }
    writeln!(out, "    return x[0]\n}}")
}

fn write_c_model(out: &mut String, network: &DenseNetwork) -> fmt::Result {
    writeln!(out)?;
    for (n, layer) in network.layers().iter().enumerate() {
        writeln!(
            out,
            "/* layer {n}: {} -> {}, {} */",
            layer.inputs(),
            layer.outputs(),
            activation_name(layer.activation())
        )?;
        writeln!(
            out,
            "static const float W{n}[{}] = {{{}}};",
            layer.weights().len(),
            float_list(layer.weights())
        )?;
        writeln!(
            out,
            "static const float B{n}[{}] = {{{}}};",
            layer.bias().len(),
            float_list(layer.bias())
        )?;
    }
    out.push_str(C_DENSE_FN);

    writeln!(out, "\nfloat predict_crutch_height(const float raw[{FEATURE_COUNT}]) {{")?;
    writeln!(out, "    float x0[{FEATURE_COUNT}];")?;
    writeln!(out, "    scale_features(raw, x0);")?;
    for (n, layer) in network.layers().iter().enumerate() {
        writeln!(out, "    float x{}[{}];", n + 1, layer.outputs())?;
        writeln!(
            out,
            "    dense(x{n}, {}, W{n}, B{n}, {}, {}, x{});",
            layer.inputs(),
            layer.outputs(),
            u8::from(layer.activation() == Activation::Relu),
            n + 1
        )?;
    }
    writeln!(out, "    return x{}[0];\n}}", network.layers().len())
}

fn activation_name(activation: Activation) -> &'static str {
    match activation {
        Activation::Identity => "identity",
        Activation::Relu => "relu",
    }
}

fn float_list<'a>(values: impl IntoIterator<Item = &'a f32>) -> String {
    values
        .into_iter()
        .map(|v| format!("{v:?}f"))
        .collect::<Vec<_>>()
        .join(", ")
}

const KOTLIN_SCALE_FN: &str = r#"
fun scaleFeatures(raw: FloatArray): FloatArray {
    val scaled = FloatArray(raw.size)
    for (i in raw.indices) {
        val range = MAX_VALUES[i] - MIN_VALUES[i]
        scaled[i] = if (range > 0f) (raw[i] - MIN_VALUES[i]) / range else 0f
    }
    return scaled
}
"#;

const KOTLIN_DENSE_FN: &str = r#"
private fun dense(x: FloatArray, w: FloatArray, b: FloatArray, relu: Boolean): FloatArray {
    val out = FloatArray(b.size)
    for (j in out.indices) {
        var acc = 0f
        for (i in x.indices) {
            acc += x[i] * w[i * out.size + j]
        }
        acc += b[j]
        out[j] = if (relu && acc < 0f) 0f else acc
    }
    return out
}
"#;

const C_SCALE_FN: &str = r#"
void scale_features(const float raw[4], float scaled[4]) {
    for (int i = 0; i < 4; i++) {
        float range = MAX_VALUES[i] - MIN_VALUES[i];
        scaled[i] = range > 0.0f ? (raw[i] - MIN_VALUES[i]) / range : 0.0f;
    }
}
"#;

const C_DENSE_FN: &str = r#"
static void dense(const float *x, int n_in, const float *w, const float *b,
                  int n_out, int relu, float *out) {
    for (int j = 0; j < n_out; j++) {
        float acc = 0.0f;
        for (int i = 0; i < n_in; i++) {
            acc += x[i] * w[i * n_out + j];
        }
        acc += b[j];
        out[j] = relu && acc < 0.0f ? 0.0f : acc;
    }
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use feature_scaler::ScalerParams;
    use inference_engine::{DenseLayer, Precision};
    use uuid::Uuid;

    fn artifact() -> ScalerArtifact {
        let params =
            ScalerParams::new([150.0, 35.0, 45.0, 50.0], [190.0, 45.0, 55.0, 95.0]).unwrap();
        ScalerArtifact::new(&params, Uuid::nil())
    }

    fn linear() -> DenseNetwork {
        DenseNetwork::linear([1.0, 2.0, 3.0, 4.0], 0.5)
    }

    #[test]
    fn test_guide_contains_constants() {
        let network = linear();
        let guide =
            render_guide(&artifact(), Some(&network), Path::new("models/m.bin"), Some(2048))
                .unwrap();

        assert!(guide.contains("Model size: 2.00 KB"));
        assert!(guide.contains("floatArrayOf(150.0f, 35.0f, 45.0f, 50.0f)"));
        assert!(guide.contains("static const float MAX_VALUES[4] = {190.0f, 45.0f, 55.0f, 95.0f};"));
        assert!(guide.contains("  3: UserWeight_kg"));
        assert!(guide.contains("[40.0, 10.0, 10.0, 45.0]"));

        assert!(guide.contains("float32 tensor of shape (1, 4)"));
        assert!(guide.contains("float32 tensor of shape (1, 1)"));
        assert!(guide.contains("  0: 4 -> 1, identity"));

        assert!(guide.contains("private val W0 = floatArrayOf(1.0f, 2.0f, 3.0f, 4.0f)"));
        assert!(guide.contains("private val B0 = floatArrayOf(0.5f)"));
        assert!(guide.contains("x = dense(x, W0, B0, relu = false)"));
        assert!(guide.contains("fun predictCrutchHeight(raw: FloatArray): Float {"));

        assert!(guide.contains("static const float W0[4] = {1.0f, 2.0f, 3.0f, 4.0f};"));
        assert!(guide.contains("static const float B0[1] = {0.5f};"));
        assert!(guide.contains("dense(x0, 4, W0, B0, 1, 0, x1);"));
        assert!(guide.contains("return x1[0];"));
    }

    #[test]
    fn test_guide_chains_hidden_layers() {
        let hidden = DenseLayer::from_row_major(
            4,
            2,
            vec![1.0, -1.0, 0.5, 0.0, 0.0, 0.25, -2.0, 1.0],
            vec![0.1, -0.1],
            Activation::Relu,
        )
        .unwrap();
        let output =
            DenseLayer::from_row_major(2, 1, vec![3.0, 4.0], vec![100.0], Activation::Identity)
                .unwrap();
        let network = DenseNetwork::new(vec![hidden, output]).unwrap();

        let guide = render_guide(&artifact(), Some(&network), Path::new("m.bin"), None).unwrap();

        assert!(guide.contains("  0: 4 -> 2, relu"));
        assert!(guide.contains("  1: 2 -> 1, identity"));
        assert!(guide.contains(
            "private val W0 = floatArrayOf(1.0f, -1.0f, 0.5f, 0.0f, 0.0f, 0.25f, -2.0f, 1.0f)"
        ));
        assert!(guide.contains("x = dense(x, W0, B0, relu = true)"));
        assert!(guide.contains("x = dense(x, W1, B1, relu = false)"));
        assert!(guide.contains("static const float W0[8] = {1.0f, -1.0f, 0.5f, 0.0f, 0.0f, 0.25f, -2.0f, 1.0f};"));
        assert!(guide.contains("static const float B1[1] = {100.0f};"));
        assert!(guide.contains("dense(x0, 4, W0, B0, 2, 1, x1);"));
        assert!(guide.contains("dense(x1, 2, W1, B1, 1, 0, x2);"));
        assert!(guide.contains("return x2[0];"));
    }

    #[test]
    fn test_guide_exports_decoded_half_precision_weights() {
        let dir = tempfile::tempdir().unwrap();
        let scaler = artifact();
        let path = dir.path().join("model.bin");
        let model = ModelArtifact::from_network(
            &linear(),
            scaler.run_id,
            scaler.fingerprint.clone(),
            Precision::F16,
        );
        model.save(&path).unwrap();

        let network = load_network(&path, &scaler).unwrap().unwrap();
        let guide = render_guide(&scaler, Some(&network), &path, None).unwrap();
        assert!(guide.contains("private val W0 = floatArrayOf(1.0f, 2.0f, 3.0f, 4.0f)"));
    }

    #[test]
    fn test_guide_rejects_model_from_other_run() {
        let dir = tempfile::tempdir().unwrap();
        let scaler = artifact();
        let path = dir.path().join("model.json");
        let model = ModelArtifact::from_network(
            &linear(),
            Uuid::new_v4(),
            scaler.fingerprint.clone(),
            Precision::F32,
        );
        model.save(&path).unwrap();

        assert!(load_network(&path, &scaler).is_err());
    }

    #[test]
    fn test_guide_without_model_file() {
        assert!(load_network(Path::new("missing.bin"), &artifact()).unwrap().is_none());
        let guide = render_guide(&artifact(), None, Path::new("missing.bin"), None).unwrap();
        assert!(guide.contains("Model size: (not found)"));
        assert!(guide.contains("(no model weights available)"));
        assert!(guide.contains("fun scaleFeatures"));
        assert!(!guide.contains("predictCrutchHeight"));
    }
}
