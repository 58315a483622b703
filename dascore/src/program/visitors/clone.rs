use crate::program::Variable;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

type VariableMap = HashMap<*const RefCell<Variable>, Rc<RefCell<Variable>>>;

/// State shared by a deep copy of a subtree.
///
/// Variables declared inside the copied subtree are cloned once and recorded here, so that the
/// `ExprVar` nodes referring to them can be redirected to the copies. Variables declared outside
/// (globals, captured locals) are not in the map and keep their original links.
#[derive(Default)]
pub struct CloneContext {
    variable_map: VariableMap,
}

impl CloneContext {
    pub fn new() -> CloneContext {
        CloneContext::default()
    }

    /// Copies a variable declared by the subtree and records the copy.
    pub fn clone_variable(&mut self, variable: &Rc<RefCell<Variable>>) -> Rc<RefCell<Variable>> {
        let cloned = Rc::new(RefCell::new(variable.borrow().clone_in(self)));
        self.variable_map
            .insert(Rc::as_ptr(variable), Rc::clone(&cloned));
        cloned
    }

    pub fn clone_variables(
        &mut self,
        variables: &[Rc<RefCell<Variable>>],
    ) -> Vec<Rc<RefCell<Variable>>> {
        variables
            .iter()
            .map(|variable| self.clone_variable(variable))
            .collect()
    }

    /// Returns the copy of a variable if it was cloned in this context, or the variable itself.
    pub fn remap_variable(&self, variable: &Rc<RefCell<Variable>>) -> Rc<RefCell<Variable>> {
        match self.variable_map.get(&Rc::as_ptr(variable)) {
            Some(cloned) => Rc::clone(cloned),
            None => Rc::clone(variable),
        }
    }
}
