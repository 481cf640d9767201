use common::{FeedForwardNetwork, Trainable, TransferFunction};
use nalgebra::{DMatrix, DVector};
use trainers::{Backprop, Trainer, TrainingMethod, UpdateMethod};

/// Scalar parameters of a 1-1-1 network
#[derive(Debug, Clone, Copy)]
struct Params {
    w1: f64,
    b1: f64,
    w2: f64,
    b2: f64,
}

/// Gradient of one row, computed by hand: logistic hidden unit, linear output
fn gradient(p: &Params, x: f64, t: f64) -> Params {
    let h = 1.0 / (1.0 + (-(p.w1 * x + p.b1)).exp());
    let y = p.w2 * h + p.b2;
    let d2 = t - y;
    let d1 = p.w2 * d2 * (h * (1.0 - h));
    Params {
        w1: d1 * x,
        b1: d1,
        w2: d2 * h,
        b2: d2,
    }
}

fn network(p: &Params) -> FeedForwardNetwork {
    let mut net = FeedForwardNetwork::new(&[1, 1, 1], TransferFunction::Logistic, TransferFunction::Identity);
    net.set_weights(0, DMatrix::from_element(1, 1, p.w1));
    net.set_weights(1, DMatrix::from_element(1, 1, p.w2));
    net.set_biases(1, DVector::from_element(1, p.b1));
    net.set_biases(2, DVector::from_element(1, p.b2));
    net
}

fn read(net: &FeedForwardNetwork) -> Params {
    Params {
        w1: net.weights(0)[(0, 0)],
        b1: net.biases(1)[0],
        w2: net.weights(1)[(0, 0)],
        b2: net.biases(2)[0],
    }
}

fn assert_close(a: &Params, b: &Params) {
    for (x, y) in [(a.w1, b.w1), (a.b1, b.b1), (a.w2, b.w2), (a.b2, b.b2)] {
        assert!((x - y).abs() < 1e-12, "{:?} vs {:?}", a, b);
    }
}

fn run(momentum: f64) -> (Params, Params) {
    let start = Params {
        w1: 0.5,
        b1: 0.1,
        w2: -0.3,
        b2: 0.2,
    };
    let inputs = DMatrix::from_row_slice(2, 1, &[1.0, -0.5]);
    let targets = DMatrix::from_row_slice(2, 1, &[0.7, 0.1]);

    let bp = Backprop::new(0.25, momentum, UpdateMethod::Single, Some(0));
    let mut trainer = Trainer::new(network(&start), TrainingMethod::Backprop(bp));
    trainer.set_data(inputs, targets).unwrap();

    trainer.update().unwrap();
    let first = read(trainer.network());
    trainer.update().unwrap();
    let second = read(trainer.network());
    (first, second)
}

#[test]
fn zero_momentum_is_plain_gradient_descent() {
    if let Err(_) = pretty_env_logger::try_init() {}

    let lr = 0.25;
    let p0 = Params {
        w1: 0.5,
        b1: 0.1,
        w2: -0.3,
        b2: 0.2,
    };
    let g0 = gradient(&p0, 1.0, 0.7);
    let p1 = Params {
        w1: p0.w1 + lr * g0.w1,
        b1: p0.b1 + lr * g0.b1,
        w2: p0.w2 + lr * g0.w2,
        b2: p0.b2 + lr * g0.b2,
    };
    // single mode moves on to the second row
    let g1 = gradient(&p1, -0.5, 0.1);
    let p2 = Params {
        w1: p1.w1 + lr * g1.w1,
        b1: p1.b1 + lr * g1.b1,
        w2: p1.w2 + lr * g1.w2,
        b2: p1.b2 + lr * g1.b2,
    };

    let (first, second) = run(0.0);
    assert_close(&first, &p1);
    assert_close(&second, &p2);
}

#[test]
fn momentum_remembers_the_previous_update() {
    let lr = 0.25;
    let m = 0.5;
    let p0 = Params {
        w1: 0.5,
        b1: 0.1,
        w2: -0.3,
        b2: 0.2,
    };
    let g0 = gradient(&p0, 1.0, 0.7);
    let d0 = Params {
        w1: lr * g0.w1,
        b1: lr * g0.b1,
        w2: lr * g0.w2,
        b2: lr * g0.b2,
    };
    let p1 = Params {
        w1: p0.w1 + d0.w1,
        b1: p0.b1 + d0.b1,
        w2: p0.w2 + d0.w2,
        b2: p0.b2 + d0.b2,
    };
    let g1 = gradient(&p1, -0.5, 0.1);
    let p2 = Params {
        w1: p1.w1 + lr * g1.w1 + m * d0.w1,
        b1: p1.b1 + lr * g1.b1 + m * d0.b1,
        w2: p1.w2 + lr * g1.w2 + m * d0.w2,
        b2: p1.b2 + lr * g1.b2 + m * d0.b2,
    };

    let (first, second) = run(m);
    assert_close(&first, &p1);
    assert_close(&second, &p2);
}

#[test]
fn epoch_mode_averages_errors() {
    let p = Params {
        w1: 0.5,
        b1: 0.1,
        w2: -0.3,
        b2: 0.2,
    };
    let inputs = DMatrix::from_row_slice(2, 1, &[1.0, -0.5]);
    let targets = DMatrix::from_row_slice(2, 1, &[0.7, 0.1]);

    let mut net = network(&p);
    let expected: f64 = (0..2)
        .map(|r| {
            let y = net.forward(&[inputs[(r, 0)]])[0];
            (targets[(r, 0)] - y).powi(2)
        })
        .sum::<f64>()
        / 2.0;

    let mut trainer = Trainer::new(net, TrainingMethod::Backprop(Backprop::new(0.1, 0.0, UpdateMethod::Epoch, None)));
    trainer.set_data(inputs, targets).unwrap();
    let err = trainer.update().unwrap();
    assert!((err - expected).abs() < 1e-12);

    // the applied update is the mean of both row gradients
    let g0 = gradient(&p, 1.0, 0.7);
    let g1 = gradient(&p, -0.5, 0.1);
    let after = read(trainer.network());
    assert!((after.w2 - (p.w2 + 0.1 * (g0.w2 + g1.w2) / 2.0)).abs() < 1e-12);
    assert_eq!(trainer.network().layer_sizes(), vec![1, 1, 1]);
}

#[test]
fn stochastic_mode_applies_one_row_gradient() {
    let p = Params {
        w1: 0.5,
        b1: 0.1,
        w2: -0.3,
        b2: 0.2,
    };
    let xs = [1.0, -0.5, 2.0];
    let ts = [0.7, 0.1, -0.4];
    let inputs = DMatrix::from_row_slice(3, 1, &xs);
    let targets = DMatrix::from_row_slice(3, 1, &ts);

    let mut net = network(&p);
    let errors: Vec<f64> = (0..3).map(|r| (ts[r] - net.forward(&[xs[r]])[0]).powi(2)).collect();

    let bp = Backprop::new(0.2, 0.0, UpdateMethod::Stochastic, Some(5));
    let mut trainer = Trainer::new(net, TrainingMethod::Backprop(bp));
    trainer.set_data(inputs, targets).unwrap();
    let err = trainer.update().unwrap();

    let row = (0..3).find(|&r| (errors[r] - err).abs() < 1e-12).unwrap();
    let g = gradient(&p, xs[row], ts[row]);
    let expected = Params {
        w1: p.w1 + 0.2 * g.w1,
        b1: p.b1 + 0.2 * g.b1,
        w2: p.w2 + 0.2 * g.w2,
        b2: p.b2 + 0.2 * g.b2,
    };
    assert_close(&read(trainer.network()), &expected);
}
