//! Instance enhancement via composition.

use crate::ContainerError;

/// Wraps the initialization of a freshly constructed component.
///
/// Implementations decorate rather than rewrite: the strategy receives the
/// initialization step as a closure and decides what happens around it. The
/// closure must be invoked exactly once.
pub trait EnhancementStrategy {
    fn around_init(
        &self,
        id: &str,
        init: &mut dyn FnMut() -> Result<(), ContainerError>,
    ) -> Result<(), ContainerError>;
}

/// Runs initialization untouched.
pub struct NoEnhancement;

impl EnhancementStrategy for NoEnhancement {
    fn around_init(
        &self,
        _id: &str,
        init: &mut dyn FnMut() -> Result<(), ContainerError>,
    ) -> Result<(), ContainerError> {
        init()
    }
}

/// Decorates initialization with pre and post hooks.
pub struct DecoratingEnhancement {
    before: Box<dyn Fn(&str)>,
    after: Box<dyn Fn(&str)>,
}

impl DecoratingEnhancement {
    #[must_use]
    pub fn new(before: impl Fn(&str) + 'static, after: impl Fn(&str) + 'static) -> Self {
        Self {
            before: Box::new(before),
            after: Box::new(after),
        }
    }
}

impl EnhancementStrategy for DecoratingEnhancement {
    fn around_init(
        &self,
        id: &str,
        init: &mut dyn FnMut() -> Result<(), ContainerError>,
    ) -> Result<(), ContainerError> {
        (self.before)(id);
        let result = init();
        if result.is_ok() {
            (self.after)(id);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn decorator_brackets_the_initialization() {
        let trace = Rc::new(RefCell::new(Vec::new()));
        let (t1, t2) = (Rc::clone(&trace), Rc::clone(&trace));
        let strategy = DecoratingEnhancement::new(
            move |id| t1.borrow_mut().push(format!("before:{id}")),
            move |id| t2.borrow_mut().push(format!("after:{id}")),
        );

        let t = Rc::clone(&trace);
        strategy
            .around_init("svc", &mut || {
                t.borrow_mut().push("init:svc".to_owned());
                Ok(())
            })
            .unwrap();

        assert_eq!(*trace.borrow(), vec!["before:svc", "init:svc", "after:svc"]);
    }

    #[test]
    fn post_hook_is_skipped_on_failure() {
        let after_ran = Rc::new(RefCell::new(false));
        let a = Rc::clone(&after_ran);
        let strategy =
            DecoratingEnhancement::new(|_| {}, move |_| *a.borrow_mut() = true);

        let result = strategy.around_init("svc", &mut || {
            Err(ContainerError::NoMatchingConstructor { type_name: "X" })
        });
        assert!(result.is_err());
        assert!(!*after_ran.borrow());
    }
}
