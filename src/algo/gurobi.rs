use crate::core::{ConflictMatrix, Instance, Selection, SolveError, Solver};
use anyhow::Result;
use grb::prelude::*;

/// Exact reference solver backed by Gurobi.
/// Receives the same constraint rows as [`super::BranchAndBound`] and is only used
/// to cross-check the other solvers.
#[derive(Clone, Debug, Default)]
pub struct Gurobi;

impl Solver for Gurobi {
    fn solve<'a>(&mut self, instance: &'a Instance) -> Result<Selection<'a>, SolveError> {
        gurobi_impl(instance).map_err(|err| SolveError::Backend(err.to_string()))
    }

    fn supports_groups(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "Gurobi"
    }
}

#[allow(unsafe_code)]
#[linkme::distributed_slice(super::SOLVERS)]
static INSTANCE: fn() -> Box<dyn Solver> = || Box::new(Gurobi);

fn create_model(name: &str) -> Result<Model> {
    let mut env = Env::new("")?;
    env.set(param::OutputFlag, 0)?;
    env.set(param::LogToConsole, 0)?;
    Ok(Model::with_env(name, env)?)
}

fn gurobi_impl(instance: &Instance) -> Result<Selection> {
    if instance.is_empty() {
        return Ok(Selection::new(instance));
    }

    let mut model = create_model("selection")?;

    let mut x = Vec::with_capacity(instance.len());
    for task in instance.tasks() {
        x.push(add_binvar!(model, name: &format!("x_{}", task.id))?);
    }

    let matrix = ConflictMatrix::new(instance.graph(), instance.len());
    for (row, &rhs) in matrix.rhs().iter().enumerate() {
        let expr = matrix.row_support(row).map(|column| x[column]).grb_sum();
        model.add_constr(&format!("c_{row}"), c!(expr <= rhs))?;
    }

    let objective = instance
        .tasks()
        .iter()
        .zip(&x)
        .map(|(task, &var)| task.weight * var)
        .grb_sum();
    model.set_objective(objective, Maximize)?;
    model.optimize()?;

    let mut selected = Vec::new();
    for (index, var) in x.iter().enumerate() {
        if model.get_obj_attr(attr::X, var)? > 0.5 {
            selected.push(index);
        }
    }

    let value = model.get_attr(attr::ObjVal)?;
    Ok(Selection::with_value(instance, selected, value))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::algo::BranchAndBound;
    use crate::data::{generate, samples, GenConfig};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_gurobi() {
        assert!(samples(true, &mut Gurobi).is_ok());
    }

    #[test]
    fn branch_and_bound_matches_gurobi() -> anyhow::Result<()> {
        let mut rng = StdRng::seed_from_u64(7);
        let config = GenConfig {
            groups: 4,
            ..GenConfig::default()
        };

        for _ in 0..20 {
            let instance = generate(&config, &mut rng)?;
            let expected = Gurobi.solve(&instance)?.value();
            let actual = BranchAndBound::default().solve(&instance)?.value();
            assert!((expected - actual).abs() < 1e-6, "{expected} != {actual}");
        }

        Ok(())
    }
}
