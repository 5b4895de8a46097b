//! Climate generative model: an autoregressive recurrent network that
//! extrapolates monthly reanalysis variables from a seed history plus known
//! future exogenous (CMIP projection) variables.
//!
//! Grounded in `tesi/zappai/repositories/climate_generative_model_repository.py`:
//! `train_model` (sequence windowing, 3x50-unit stacked LSTM + dropout +
//! dense head, Adam/MSE, 50 epochs) and `generate_data_from_seed` /
//! `generate_n_months_after_seed` (rollout with a rolling sequence window).

use candle_core::{DType, Device, Tensor, Var};
use candle_nn::{linear, AdamW, Linear, Module, Optimizer, ParamsAdamW, VarBuilder, VarMap};
use serde::{Deserialize, Serialize};

use crate::calendar::YearMonth;
use crate::climate::{FutureClimateRecord, PastClimateRecord};
use crate::error::{Result, ZappaiError};
use crate::features::{
    climate_feature_vector, climate_target_vector, recombine_prediction_with_future,
    CLIMATE_FEATURE_WIDTH, CLIMATE_TARGET_WIDTH,
};
use crate::metrics::rmse;
use crate::scaler::StandardScaler;

pub const SEQUENCE_LENGTH: usize = 12;
const HIDDEN_SIZE: usize = 50;
const NUM_LAYERS: usize = 3;
const DROPOUT: f32 = 0.2;
const EPOCHS: usize = 50;
const LEARNING_RATE: f64 = 1e-3;

/// One stacked-LSTM layer's gate projections, built from a single Linear
/// over `[x_t, h_{t-1}]` producing the four gate pre-activations, the
/// conventional from-scratch LSTM cell layout.
#[derive(Debug)]
struct LstmLayer {
    gates: Linear,
    hidden_size: usize,
}

struct LstmState {
    h: Tensor,
    c: Tensor,
}

impl LstmLayer {
    fn new(input_size: usize, hidden_size: usize, vb: VarBuilder) -> candle_core::Result<Self> {
        let gates = linear(input_size + hidden_size, 4 * hidden_size, vb)?;
        Ok(Self { gates, hidden_size })
    }

    fn zero_state(&self, batch: usize, device: &Device) -> candle_core::Result<LstmState> {
        Ok(LstmState {
            h: Tensor::zeros((batch, self.hidden_size), DType::F32, device)?,
            c: Tensor::zeros((batch, self.hidden_size), DType::F32, device)?,
        })
    }

    fn step(&self, x: &Tensor, state: &LstmState) -> candle_core::Result<LstmState> {
        let combined = Tensor::cat(&[x, &state.h], 1)?;
        let gates = self.gates.forward(&combined)?;
        let h = self.hidden_size;
        let input_gate = gates.narrow(1, 0, h)?.apply(&candle_nn::Activation::Sigmoid)?;
        let forget_gate = gates.narrow(1, h, h)?.apply(&candle_nn::Activation::Sigmoid)?;
        let cell_candidate = gates.narrow(1, 2 * h, h)?.tanh()?;
        let output_gate = gates.narrow(1, 3 * h, h)?.apply(&candle_nn::Activation::Sigmoid)?;
        let c = (forget_gate * &state.c)? + (input_gate * cell_candidate)?;
        let c = c?;
        let new_h = (output_gate * c.tanh()?)?;
        Ok(LstmState { h: new_h, c })
    }
}

/// Three stacked LSTM layers with dropout between layers, followed by a
/// dense projection to `T`'s width (spec §4.2).
#[derive(Debug)]
struct StackedGenerator {
    layers: Vec<LstmLayer>,
    dropout: candle_nn::Dropout,
    head: Linear,
}

impl StackedGenerator {
    fn new(vb: VarBuilder) -> candle_core::Result<Self> {
        let mut layers = Vec::with_capacity(NUM_LAYERS);
        for i in 0..NUM_LAYERS {
            let input_size = if i == 0 { CLIMATE_FEATURE_WIDTH } else { HIDDEN_SIZE };
            layers.push(LstmLayer::new(input_size, HIDDEN_SIZE, vb.pp(format!("lstm{i}")))?);
        }
        let head = linear(HIDDEN_SIZE, CLIMATE_TARGET_WIDTH, vb.pp("head"))?;
        Ok(Self {
            layers,
            dropout: candle_nn::Dropout::new(DROPOUT),
            head,
        })
    }

    /// Runs the stack over a `(batch, seq_len, features)` tensor, returning
    /// the final time step's projection to `T`.
    fn forward(&self, input: &Tensor, train: bool) -> candle_core::Result<Tensor> {
        let (batch, seq_len, _) = input.dims3()?;
        let device = input.device();
        let mut layer_input = input.clone();
        for (i, layer) in self.layers.iter().enumerate() {
            let mut state = layer.zero_state(batch, device)?;
            let mut outputs = Vec::with_capacity(seq_len);
            for t in 0..seq_len {
                let x_t = layer_input.narrow(1, t, 1)?.squeeze(1)?;
                state = layer.step(&x_t, &state)?;
                outputs.push(state.h.clone());
            }
            let stacked = Tensor::stack(&outputs, 1)?;
            layer_input = if i + 1 < self.layers.len() {
                self.dropout.forward(&stacked, train)?
            } else {
                stacked
            };
        }
        let last = layer_input.narrow(1, seq_len - 1, 1)?.squeeze(1)?;
        self.head.forward(&last)
    }
}

/// A trained climate generative model for one location: weights plus the
/// scalers used to standardize features/targets during training.
pub struct ClimateGenerativeModel {
    varmap: VarMap,
    net: StackedGenerator,
    x_scaler: StandardScaler,
    y_scaler: StandardScaler,
    device: Device,
    pub train_span: (YearMonth, YearMonth),
    pub validation_span: (YearMonth, YearMonth),
    pub test_span: (YearMonth, YearMonth),
    pub validation_rmse: f64,
}

impl std::fmt::Debug for ClimateGenerativeModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClimateGenerativeModel")
            .field("net", &self.net)
            .field("x_scaler", &self.x_scaler)
            .field("y_scaler", &self.y_scaler)
            .field("device", &self.device)
            .field("train_span", &self.train_span)
            .field("validation_span", &self.validation_span)
            .field("test_span", &self.test_span)
            .field("validation_rmse", &self.validation_rmse)
            .finish()
    }
}

fn build_sequences(
    rows: &[[f64; CLIMATE_FEATURE_WIDTH]],
    targets: &[[f64; CLIMATE_TARGET_WIDTH]],
) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
    let mut x = Vec::new();
    let mut y = Vec::new();
    for i in 0..rows.len().saturating_sub(SEQUENCE_LENGTH) {
        let window: Vec<f64> = rows[i..i + SEQUENCE_LENGTH].iter().flatten().copied().collect();
        x.push(window);
        y.push(targets[i + SEQUENCE_LENGTH].to_vec());
    }
    (x, y)
}

fn chronological_split<T: Clone>(items: &[T]) -> (Vec<T>, Vec<T>, Vec<T>) {
    let n = items.len();
    let train_end = (n as f64 * 0.70).round() as usize;
    let validation_end = (n as f64 * 0.85).round() as usize;
    (
        items[..train_end].to_vec(),
        items[train_end..validation_end].to_vec(),
        items[validation_end..].to_vec(),
    )
}

impl ClimateGenerativeModel {
    /// Trains a fresh model on `records`, which must be in ascending,
    /// contiguous calendar order for one location.
    pub fn train(records: &[PastClimateRecord]) -> Result<Self> {
        if records.len() < SEQUENCE_LENGTH * 3 {
            return Err(ZappaiError::InsufficientHistory {
                needed: SEQUENCE_LENGTH * 3,
                got: records.len(),
            });
        }
        let (train_records, validation_records, test_records) = chronological_split(records);

        let feature_rows: Vec<[f64; CLIMATE_FEATURE_WIDTH]> =
            records.iter().map(climate_feature_vector).collect();
        let target_rows: Vec<[f64; CLIMATE_TARGET_WIDTH]> =
            records.iter().map(climate_target_vector).collect();

        let train_feature_rows: Vec<Vec<f64>> = feature_rows[..train_records.len()]
            .iter()
            .map(|r| r.to_vec())
            .collect();
        let train_target_rows: Vec<Vec<f64>> = target_rows[..train_records.len()]
            .iter()
            .map(|r| r.to_vec())
            .collect();
        let x_scaler = StandardScaler::fit(&train_feature_rows)?;
        let y_scaler = StandardScaler::fit(&train_target_rows)?;

        let scaled_features: Vec<[f64; CLIMATE_FEATURE_WIDTH]> = feature_rows
            .iter()
            .map(|r| {
                let scaled = x_scaler.transform_row(r);
                let mut out = [0.0; CLIMATE_FEATURE_WIDTH];
                out.copy_from_slice(&scaled);
                out
            })
            .collect();
        let scaled_targets: Vec<[f64; CLIMATE_TARGET_WIDTH]> = target_rows
            .iter()
            .map(|r| {
                let scaled = y_scaler.transform_row(r);
                let mut out = [0.0; CLIMATE_TARGET_WIDTH];
                out.copy_from_slice(&scaled);
                out
            })
            .collect();

        let (all_x, all_y) = build_sequences(&scaled_features, &scaled_targets);
        let train_end = train_records.len().saturating_sub(SEQUENCE_LENGTH);
        let validation_end = train_end + validation_records.len();

        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let net = StackedGenerator::new(vb).map_err(|e| ZappaiError::ComputationError(e.to_string()))?;
        let mut optimizer = AdamW::new(
            varmap.all_vars(),
            ParamsAdamW {
                lr: LEARNING_RATE,
                ..Default::default()
            },
        )
        .map_err(|e| ZappaiError::ComputationError(e.to_string()))?;

        let train_x = to_tensor_3d(&all_x[..train_end], SEQUENCE_LENGTH, CLIMATE_FEATURE_WIDTH, &device)
            .map_err(|e| ZappaiError::ComputationError(e.to_string()))?;
        let train_y = to_tensor_2d(&all_y[..train_end], &device)
            .map_err(|e| ZappaiError::ComputationError(e.to_string()))?;

        for _epoch in 0..EPOCHS {
            let predicted = net
                .forward(&train_x, true)
                .map_err(|e| ZappaiError::ComputationError(e.to_string()))?;
            let loss = predicted
                .sub(&train_y)
                .and_then(|d| d.sqr())
                .and_then(|d| d.mean_all())
                .map_err(|e| ZappaiError::ComputationError(e.to_string()))?;
            optimizer
                .backward_step(&loss)
                .map_err(|e| ZappaiError::ComputationError(e.to_string()))?;
        }

        let validation_x = to_tensor_3d(
            &all_x[train_end..validation_end],
            SEQUENCE_LENGTH,
            CLIMATE_FEATURE_WIDTH,
            &device,
        )
        .map_err(|e| ZappaiError::ComputationError(e.to_string()))?;
        let predicted_validation = net
            .forward(&validation_x, false)
            .map_err(|e| ZappaiError::ComputationError(e.to_string()))?;
        let predicted_flat: Vec<f64> = predicted_validation
            .flatten_all()
            .and_then(|t| t.to_vec1::<f32>())
            .map_err(|e| ZappaiError::ComputationError(e.to_string()))?
            .into_iter()
            .map(|v| v as f64)
            .collect();
        let actual_flat: Vec<f64> = all_y[train_end..validation_end]
            .iter()
            .flatten()
            .copied()
            .collect();
        let validation_rmse = rmse(&actual_flat, &predicted_flat)?;

        Ok(Self {
            varmap,
            net,
            x_scaler,
            y_scaler,
            device,
            train_span: (train_records[0].year_month, train_records[train_records.len() - 1].year_month),
            validation_span: (
                validation_records[0].year_month,
                validation_records[validation_records.len() - 1].year_month,
            ),
            test_span: (
                test_records[0].year_month,
                test_records[test_records.len() - 1].year_month,
            ),
            validation_rmse,
        })
    }

    /// Generates `n` months of data following `seed`, using `future` for the
    /// known exogenous variables at each step. `seed` must be exactly
    /// [`SEQUENCE_LENGTH`] contiguous, ascending months ending immediately
    /// before `future`'s first month (spec §4.2 rollout protocol). If
    /// `future` holds fewer than `n` months, the rollout stops early and
    /// returns what's available rather than extrapolating projections.
    pub fn generate(
        &self,
        seed: &[PastClimateRecord],
        future: &[FutureClimateRecord],
        n: usize,
    ) -> Result<Vec<PastClimateRecord>> {
        if seed.len() != SEQUENCE_LENGTH {
            return Err(ZappaiError::InsufficientHistory {
                needed: SEQUENCE_LENGTH,
                got: seed.len(),
            });
        }
        for pair in seed.windows(2) {
            if pair[0].year_month.next() != pair[1].year_month {
                return Err(ZappaiError::NonSequentialSeed {
                    seed_end: (pair[0].year_month.year, pair[0].year_month.month),
                    projection_start: (pair[1].year_month.year, pair[1].year_month.month),
                    expected: (pair[0].year_month.next().year, pair[0].year_month.next().month),
                });
            }
        }
        let seed_end = seed[seed.len() - 1].year_month;
        let expected_start = seed_end.next();
        if future.is_empty() || future[0].year_month != expected_start {
            let got = future.first().map(|r| r.year_month).unwrap_or(expected_start);
            return Err(ZappaiError::NonSequentialSeed {
                seed_end: (seed_end.year, seed_end.month),
                projection_start: (got.year, got.month),
                expected: (expected_start.year, expected_start.month),
            });
        }
        let mut window: Vec<[f64; CLIMATE_FEATURE_WIDTH]> = seed
            .iter()
            .map(|r| {
                let scaled = self.x_scaler.transform_row(&climate_feature_vector(r));
                let mut out = [0.0; CLIMATE_FEATURE_WIDTH];
                out.copy_from_slice(&scaled);
                out
            })
            .collect();

        let mut generated = Vec::with_capacity(n);
        for future_record in future.iter().take(n) {
            let flat: Vec<f64> = window.iter().flatten().copied().collect();
            let input = to_tensor_3d(&[flat], SEQUENCE_LENGTH, CLIMATE_FEATURE_WIDTH, &self.device)
                .map_err(|e| ZappaiError::ComputationError(e.to_string()))?;
            let predicted = self
                .net
                .forward(&input, false)
                .map_err(|e| ZappaiError::ComputationError(e.to_string()))?;
            let predicted_scaled: Vec<f64> = predicted
                .flatten_all()
                .and_then(|t| t.to_vec1::<f32>())
                .map_err(|e| ZappaiError::ComputationError(e.to_string()))?
                .into_iter()
                .map(|v| v as f64)
                .collect();
            let predicted_target_vec = self.y_scaler.inverse_transform_row(&predicted_scaled);
            let mut predicted_target = [0.0; CLIMATE_TARGET_WIDTH];
            predicted_target.copy_from_slice(&predicted_target_vec);

            let enriched = recombine_prediction_with_future(&predicted_target, future_record);
            generated.push(PastClimateRecord {
                year_month: future_record.year_month,
                surface_net_solar_radiation: predicted_target[0],
                surface_net_thermal_radiation: predicted_target[1],
                snowfall: predicted_target[2],
                total_cloud_cover: predicted_target[3],
                dewpoint_temperature_2m: predicted_target[4],
                soil_temperature_level_3: predicted_target[5],
                volumetric_soil_water_layer_3: predicted_target[6],
                wind_u_component_10m: future_record.wind_u_component_10m,
                wind_v_component_10m: future_record.wind_v_component_10m,
                temperature_2m: future_record.temperature_2m,
                evaporation: future_record.evaporation,
                total_precipitation: future_record.total_precipitation,
                surface_pressure: future_record.surface_pressure,
                surface_solar_radiation_downwards: future_record.surface_solar_radiation_downwards,
                surface_thermal_radiation_downwards: future_record.surface_thermal_radiation_downwards,
            });

            // Roll the window forward by one month (spec §4.2 rolling shift).
            let mut next_scaled = [0.0; CLIMATE_FEATURE_WIDTH];
            next_scaled.copy_from_slice(&self.x_scaler.transform_row(&enriched));
            window.remove(0);
            window.push(next_scaled);
        }
        Ok(generated)
    }

    pub fn parameter_count(&self) -> usize {
        self.varmap.all_vars().iter().map(|v| v.elem_count()).sum()
    }

    /// Captures a `bincode`-serializable snapshot of the trained weights,
    /// scalers, and split metadata — the per-location persisted artifact
    /// spec §3/§9 describes ("serialize them through a standard numeric-array
    /// format"). The network's own tensors have no `serde` impl, so each is
    /// flattened to its raw `f32` data plus shape.
    pub fn snapshot(&self) -> Result<ClimateGenerativeModelSnapshot> {
        let vars = self.varmap.data().lock().map_err(|_| {
            ZappaiError::ComputationError("model weights lock poisoned".to_string())
        })?;
        let mut tensors = Vec::with_capacity(vars.len());
        for (name, var) in vars.iter() {
            let tensor = var.as_tensor();
            let shape = tensor.dims().to_vec();
            let data = tensor
                .flatten_all()
                .and_then(|t| t.to_vec1::<f32>())
                .map_err(|e| ZappaiError::ComputationError(e.to_string()))?;
            tensors.push((name.clone(), shape, data));
        }
        Ok(ClimateGenerativeModelSnapshot {
            tensors,
            x_scaler: self.x_scaler.clone(),
            y_scaler: self.y_scaler.clone(),
            train_span: self.train_span,
            validation_span: self.validation_span,
            test_span: self.test_span,
            validation_rmse: self.validation_rmse,
        })
    }

    /// Rebuilds a model from a snapshot: restores every named tensor into a
    /// fresh `VarMap` before constructing the network, so `VarBuilder` picks
    /// up the trained weights instead of randomly initializing them.
    pub fn from_snapshot(snapshot: ClimateGenerativeModelSnapshot) -> Result<Self> {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        {
            let mut vars = varmap.data().lock().map_err(|_| {
                ZappaiError::ComputationError("model weights lock poisoned".to_string())
            })?;
            for (name, shape, data) in snapshot.tensors {
                let tensor = Tensor::from_vec(data, shape, &device)
                    .map_err(|e| ZappaiError::ComputationError(e.to_string()))?;
                let var = Var::from_tensor(&tensor).map_err(|e| ZappaiError::ComputationError(e.to_string()))?;
                vars.insert(name, var);
            }
        }
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let net = StackedGenerator::new(vb).map_err(|e| ZappaiError::ComputationError(e.to_string()))?;
        Ok(Self {
            varmap,
            net,
            x_scaler: snapshot.x_scaler,
            y_scaler: snapshot.y_scaler,
            device,
            train_span: snapshot.train_span,
            validation_span: snapshot.validation_span,
            test_span: snapshot.test_span,
            validation_rmse: snapshot.validation_rmse,
        })
    }
}

/// `bincode`-serializable snapshot of a [`ClimateGenerativeModel`]. Each
/// tensor is stored as `(name, shape, flattened f32 data)`.
#[derive(Serialize, Deserialize)]
pub struct ClimateGenerativeModelSnapshot {
    tensors: Vec<(String, Vec<usize>, Vec<f32>)>,
    x_scaler: StandardScaler,
    y_scaler: StandardScaler,
    train_span: (YearMonth, YearMonth),
    validation_span: (YearMonth, YearMonth),
    test_span: (YearMonth, YearMonth),
    validation_rmse: f64,
}

fn to_tensor_3d(
    rows: &[Vec<f64>],
    seq_len: usize,
    width: usize,
    device: &Device,
) -> candle_core::Result<Tensor> {
    let flat: Vec<f32> = rows.iter().flatten().map(|v| *v as f32).collect();
    Tensor::from_vec(flat, (rows.len(), seq_len, width), device)
}

fn to_tensor_2d(rows: &[Vec<f64>], device: &Device) -> candle_core::Result<Tensor> {
    let width = rows.first().map(|r| r.len()).unwrap_or(0);
    let flat: Vec<f32> = rows.iter().flatten().map(|v| *v as f32).collect();
    Tensor::from_vec(flat, (rows.len(), width), device)
}
