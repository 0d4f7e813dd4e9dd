use swc_core::ecma::ast::Program;

/// A single rewrite over a parsed program.
///
/// `run` returns how many nodes it changed. Zero means the program was left
/// untouched, which callers rely on to skip reprinting and to stop iterating.
pub trait TreePass {
    fn name(&self) -> &'static str;

    fn run(&mut self, program: &mut Program) -> usize;
}
