use common::{Cancellation, FeedForwardNetwork, NullSink, Trainable, TransferFunction};
use nalgebra::DMatrix;
use trainers::{IterableTrainer, LmsIterative, StoppingCondition, Trainer, TrainingMethod};

fn and_data() -> (DMatrix<f64>, DMatrix<f64>) {
    let inputs = DMatrix::from_row_slice(4, 2, &[1.0, 1.0, 1.0, -1.0, -1.0, 1.0, -1.0, -1.0]);
    let targets = DMatrix::from_row_slice(4, 1, &[1.0, 0.0, 0.0, 0.0]);
    (inputs, targets)
}

fn and_trainer(seed: u64) -> Trainer<FeedForwardNetwork> {
    let net = FeedForwardNetwork::new(&[2, 1], TransferFunction::Identity, TransferFunction::Logistic);
    let mut trainer = Trainer::new(net, TrainingMethod::LmsIterative(LmsIterative::new(0.01)));
    let (inputs, targets) = and_data();
    trainer.set_data(inputs, targets).unwrap();
    trainer.randomize(Some(seed));
    trainer
}

#[test]
fn lms_learns_and_monotonically() {
    if let Err(_) = pretty_env_logger::try_init() {}

    for seed in 0..20 {
        let mut trainer = and_trainer(seed);
        let mut prev = f64::MAX;
        let mut epochs = 0;
        while epochs < 2000 {
            let err = trainer.update().unwrap();
            assert!(err <= prev + 1e-12, "seed {}: error rose from {} to {}", seed, prev, err);
            prev = err;
            epochs += 1;
            if err < 1e-2 {
                break;
            }
        }
        assert!(prev < 1e-2, "seed {}: error {} after {} epochs", seed, prev, epochs);
    }
}

#[test]
fn lms_classifies_and_after_training() {
    let trainer = and_trainer(1);
    let mut it = IterableTrainer::new(trainer, StoppingCondition::ThresholdError(1e-2));
    let report = it.iterate(&Cancellation::new(), &mut NullSink).unwrap();
    assert!(report.error < 1e-2);
    assert!(report.iterations <= 2000);

    let mut net = it.into_trainer().into_network();
    let (inputs, targets) = and_data();
    for row in 0..4 {
        let out = net.forward(&[inputs[(row, 0)], inputs[(row, 1)]]);
        assert_eq!(out[0].round(), targets[(row, 0)]);
    }
    assert_eq!(net.layer_sizes(), vec![2, 1]);
}
