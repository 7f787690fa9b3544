//! Solver backends built on Gurobi.
//! Available with the `extended` feature.
use grb::prelude::*;

use super::model::{
    LinearConstraint,
    LinearConstraints,
    LinearObjective,
    QuadraticObjective,
    Relation,
    Sense,
    Solution,
};
use super::{
    LinearSolver,
    QuadraticSolver,
};
use crate::error::SolverError;


fn quiet_env() -> Result<Env, SolverError> {
    let mut env = Env::empty()?;
    env.set(param::OutputFlag, 0)?;
    env.set(param::NumericFocus, 3)?;
    Ok(env.start()?)
}


fn add_linear_constraint(
    model: &mut Model,
    vars: &[Var],
    name: &str,
    constraint: &LinearConstraint,
) -> Result<Constr, SolverError>
{
    constraint.check_range(vars.len())?;
    let lhs = constraint.coefficients.iter()
        .map(|(&i, &c)| c * vars[i])
        .grb_sum();
    let rhs = constraint.rhs;
    let constr = match constraint.relation {
        Relation::LessEqual    => model.add_constr(name, c!(lhs <= rhs))?,
        Relation::Equal        => model.add_constr(name, c!(lhs == rhs))?,
        Relation::GreaterEqual => model.add_constr(name, c!(lhs >= rhs))?,
    };
    Ok(constr)
}


fn read_solution(model: &Model, vars: &[Var])
    -> Result<Solution, SolverError>
{
    let status = model.status()?;
    match status {
        Status::Optimal => {},
        Status::Infeasible | Status::InfOrUnbd => {
            return Err(SolverError::Infeasible);
        },
        Status::Unbounded => {
            return Err(SolverError::Unbounded);
        },
        _ => {
            return Err(SolverError::NumericalFailure(
                format!("Gurobi stopped with status {status:?}")
            ));
        },
    }

    let value = model.get_attr(attr::ObjVal)?;
    let x = vars.iter()
        .map(|v| model.get_obj_attr(attr::X, v))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Solution { value, x })
}


/// A [`QuadraticSolver`] on a Gurobi model
/// with free continuous variables.
pub struct GurobiQpSolver {
    pub(self) model: Model,
    pub(self) vars: Vec<Var>,
    pub(self) n_constraints: usize,
}


impl QuadraticSolver for GurobiQpSolver {
    fn new(n_variables: usize) -> Result<Self, SolverError> {
        let mut model = Model::with_env("bundle method", quiet_env()?)?;

        let vars = (0..n_variables).map(|i| {
                let name = format!("x[{i}]");
                add_ctsvar!(model, name: &name, bounds: ..)
            }).collect::<Result<Vec<_>, _>>()?;
        model.update()?;

        Ok(Self { model, vars, n_constraints: 0 })
    }


    fn n_variables(&self) -> usize {
        self.vars.len()
    }


    fn set_objective(&mut self, objective: QuadraticObjective)
        -> Result<(), SolverError>
    {
        let quad = objective.quadratic_terms()
            .map(|((i, j), q)| q * (self.vars[i] * self.vars[j]))
            .grb_sum();
        let linear = objective.linear()
            .iter()
            .zip(&self.vars)
            .map(|(&c, &v)| c * v)
            .grb_sum();
        let expr = quad + linear + objective.constant();

        self.model.set_objective(expr, Minimize)?;
        self.model.update()?;
        Ok(())
    }


    fn add_constraint(&mut self, constraint: LinearConstraint)
        -> Result<(), SolverError>
    {
        let name = format!("hyperplane[{}]", self.n_constraints);
        add_linear_constraint(&mut self.model, &self.vars, &name, &constraint)?;
        self.n_constraints += 1;
        self.model.update()?;
        Ok(())
    }


    fn solve(&mut self) -> Result<Solution, SolverError> {
        self.model.optimize()?;
        read_solution(&self.model, &self.vars)
    }
}


/// A [`LinearSolver`] on a Gurobi model with binary variables.
pub struct GurobiIlpSolver {
    pub(self) model: Model,
    pub(self) vars: Vec<Var>,
    pub(self) constrs: Vec<Constr>,
}


impl LinearSolver for GurobiIlpSolver {
    fn new(n_variables: usize) -> Result<Self, SolverError> {
        let mut model = Model::with_env("loss-augmented inference", quiet_env()?)?;

        let vars = (0..n_variables).map(|i| {
                let name = format!("y[{i}]");
                add_binvar!(model, name: &name)
            }).collect::<Result<Vec<_>, _>>()?;
        model.update()?;

        Ok(Self { model, vars, constrs: Vec::new() })
    }


    fn n_variables(&self) -> usize {
        self.vars.len()
    }


    fn set_constraints(&mut self, constraints: LinearConstraints)
        -> Result<(), SolverError>
    {
        for constr in self.constrs.drain(..) {
            self.model.remove(constr)?;
        }
        for (k, constraint) in constraints.iter().enumerate() {
            let name = format!("feasible[{k}]");
            let constr = add_linear_constraint(
                &mut self.model, &self.vars, &name, constraint
            )?;
            self.constrs.push(constr);
        }
        self.model.update()?;
        Ok(())
    }


    fn set_objective(&mut self, objective: LinearObjective)
        -> Result<(), SolverError>
    {
        let expr = objective.coefficients()
            .iter()
            .zip(&self.vars)
            .map(|(&c, &v)| c * v)
            .grb_sum()
            + objective.constant();
        let sense = match objective.sense() {
            Sense::Maximize => Maximize,
            Sense::Minimize => Minimize,
        };
        self.model.set_objective(expr, sense)?;
        self.model.update()?;
        Ok(())
    }


    fn solve(&mut self) -> Result<Solution, SolverError> {
        self.model.optimize()?;
        let mut solution = read_solution(&self.model, &self.vars)?;
        solution.x.iter_mut()
            .for_each(|y| { *y = y.round(); });
        Ok(solution)
    }
}
